use serde::{Deserialize, Serialize};

/// A labeled edge from one scene to another.
///
/// `next` is a scene id that is only resolved when the player follows the
/// choice, so it may name a scene that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Label shown to the player.
    pub text: String,
    /// Target scene id.
    pub next: String,
}

impl Choice {
    /// Creates a choice with the given label and target.
    pub fn new(text: impl Into<String>, next: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            next: next.into(),
        }
    }
}

/// A named node in the story graph.
///
/// In the embedded payload the id is the key of the scene's record, so it is
/// skipped when a scene is (de)serialized on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene id with its original casing.
    #[serde(skip)]
    pub id: String,
    /// Body markup: one `<p>` element per paragraph.
    pub text: String,
    /// Outgoing choices in document order.
    pub choices: Vec<Choice>,
    /// Optional icon glyph.
    pub icon: Option<String>,
    /// Optional accent color, always an uppercase `#RGB` or `#RRGGBB` value.
    pub color: Option<String>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            choices: Vec::new(),
            icon: None,
            color: None,
        }
    }

    /// Lookup key for this scene.
    pub fn key(&self) -> String {
        scene_key(&self.id)
    }

    /// A scene without choices ends the story.
    pub fn is_terminal(&self) -> bool {
        self.choices.is_empty()
    }
}

/// Normalizes a scene id for case-insensitive comparison.
pub fn scene_key(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Validates a `#RGB` / `#RRGGBB` color and returns it in uppercase.
///
/// Returns `None` for anything else, including named colors and 4- or
/// 8-digit forms.
pub fn parse_hex_color(value: &str) -> Option<String> {
    let digits = value.strip_prefix('#')?;
    if !matches!(digits.len(), 3 | 6) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(value.to_ascii_uppercase())
}
