//! Configuration for a story session.

/// Store key the save list lives under.
pub const DEFAULT_SAVE_KEY: &str = "interactive_novel_saves";

/// Configuration for a runtime session.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Key of the save list in the persistent store.
    pub save_key: String,
    /// Icon shown for scenes without one.
    pub default_icon: String,
    /// Accent color for scenes without one.
    pub default_color: String,
    /// Label of the synthetic choice offered by terminal scenes.
    pub restart_label: String,
    /// Marker shown under a terminal scene.
    pub end_marker: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            save_key: DEFAULT_SAVE_KEY.to_string(),
            default_icon: "💠".to_string(),
            default_color: "#4ECDC4".to_string(),
            restart_label: "Start Over".to_string(),
            end_marker: "[End of Story]".to_string(),
        }
    }
}

impl EngineConfig {
    /// Set the store key for the save list.
    pub fn with_save_key(mut self, key: impl Into<String>) -> Self {
        self.save_key = key.into();
        self
    }

    /// Set the fallback icon.
    pub fn with_default_icon(mut self, icon: impl Into<String>) -> Self {
        self.default_icon = icon.into();
        self
    }

    /// Set the fallback accent color.
    pub fn with_default_color(mut self, color: impl Into<String>) -> Self {
        self.default_color = color.into();
        self
    }

    /// Set the restart choice label.
    pub fn with_restart_label(mut self, label: impl Into<String>) -> Self {
        self.restart_label = label.into();
        self
    }

    /// Set the marker shown under terminal scenes.
    pub fn with_end_marker(mut self, marker: impl Into<String>) -> Self {
        self.end_marker = marker.into();
        self
    }
}
