//! Compiler configuration.

use crate::paragraph::HEADING_1;

/// Options controlling how a paragraph stream is compiled.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Paragraphs whose style starts with this name open a new scene.
    pub heading_style: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            heading_style: HEADING_1.to_string(),
        }
    }
}

impl CompilerOptions {
    /// Set the style name that marks scene headings.
    pub fn with_heading_style(mut self, style: impl Into<String>) -> Self {
        self.heading_style = style.into();
        self
    }

    /// Whether a paragraph style marks a scene heading.
    pub fn is_heading(&self, style: &str) -> bool {
        style.starts_with(&self.heading_style)
    }
}
