//! The styled paragraph stream a story document is read as.

use std::path::Path;

use crate::error::{DslError, DslResult};

/// Style tag of scene headings.
pub const HEADING_1: &str = "Heading 1";

/// Style tag of ordinary body paragraphs.
pub const NORMAL: &str = "Normal";

/// One paragraph of the source document with its style tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    /// Raw paragraph text (untrimmed).
    pub text: String,
    /// Style name as reported by the document reader, e.g. `Heading 1`.
    pub style: String,
}

impl Paragraph {
    /// Creates a paragraph with an explicit style.
    pub fn new(text: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: style.into(),
        }
    }

    /// A `Heading 1` paragraph.
    pub fn heading(text: impl Into<String>) -> Self {
        Self::new(text, HEADING_1)
    }

    /// A `Normal` paragraph.
    pub fn body(text: impl Into<String>) -> Self {
        Self::new(text, NORMAL)
    }
}

/// Anything that can hand the compiler an ordered paragraph stream.
pub trait ParagraphSource {
    /// Paragraphs in document order.
    fn paragraphs(&self) -> &[Paragraph];
}

impl ParagraphSource for Vec<Paragraph> {
    fn paragraphs(&self) -> &[Paragraph] {
        self
    }
}

/// Joins paragraph texts with newlines.
///
/// Diagnostic spans index into this listing.
pub fn listing(paragraphs: &[Paragraph]) -> String {
    paragraphs
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A plain-text story document.
///
/// Each line is one paragraph. Lines starting with one to six `#` followed by
/// a space are headings of that level (`# Forest` is a `Heading 1`
/// paragraph with text `Forest`); every other line is `Normal`.
#[derive(Debug, Clone, Default)]
pub struct TextDocument {
    paragraphs: Vec<Paragraph>,
}

impl TextDocument {
    /// Parses a plain-text document.
    pub fn parse(source: &str) -> Self {
        let paragraphs = source.lines().map(parse_line).collect();
        Self { paragraphs }
    }

    /// Reads and parses a document from disk.
    pub fn open(path: &Path) -> DslResult<Self> {
        if !path.exists() {
            return Err(DslError::SourceNotFound(path.to_path_buf()));
        }
        let source = std::fs::read_to_string(path).map_err(|source| DslError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&source))
    }
}

impl ParagraphSource for TextDocument {
    fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }
}

fn parse_line(line: &str) -> Paragraph {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) {
        if let Some(text) = line[hashes..].strip_prefix(' ') {
            return Paragraph::new(text, format!("Heading {hashes}"));
        }
    }
    Paragraph::body(line)
}
