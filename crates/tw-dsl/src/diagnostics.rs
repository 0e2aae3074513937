use std::fmt;
use std::ops::Range;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};

/// Byte range into the document listing (see [`crate::paragraph::listing`]).
pub type Span = Range<usize>;

/// How serious a compiler finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// No story can be produced.
    Error,
    /// Part of the document was skipped; the story is still produced.
    Warning,
}

/// A located compiler finding.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// How serious the finding is.
    pub severity: Severity,
    /// Where in the listing it applies. Document-wide findings use `0..0`.
    pub span: Span,
    /// One-line summary.
    pub message: String,
    /// Text shown at the highlighted span.
    pub label: Option<String>,
    /// Hint for the author, shown under the report.
    pub note: Option<String>,
}

impl Diagnostic {
    fn new(severity: Severity, span: Span, message: impl Into<String>) -> Self {
        Self {
            severity,
            span,
            message: message.into(),
            label: None,
            note: None,
        }
    }

    /// A finding that prevents a story from being produced.
    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, span, message)
    }

    /// A finding that only skips part of the document.
    pub fn warning(span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, span, message)
    }

    /// Sets the span label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the author hint.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub(crate) fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "error: {}", self.message),
            Severity::Warning => write!(f, "warning: {}", self.message),
        }
    }
}

/// Number of diagnostics with the given severity.
pub fn count(diagnostics: &[Diagnostic], severity: Severity) -> usize {
    diagnostics.iter().filter(|d| d.severity == severity).count()
}

/// Renders diagnostics against the document listing with ariadne.
pub fn render_diagnostics(listing: &str, filename: &str, diagnostics: &[Diagnostic]) -> String {
    let mut output = Vec::new();

    for diag in diagnostics {
        let (kind, color) = match diag.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };

        let mut report = Report::build(kind, (filename, diag.span.clone()))
            .with_config(Config::default().with_index_type(IndexType::Byte))
            .with_message(&diag.message);
        // A document-wide finding has nothing to point at.
        if !diag.span.is_empty() {
            report = report.with_label(
                Label::new((filename, diag.span.clone()))
                    .with_message(diag.label.as_deref().unwrap_or(&diag.message))
                    .with_color(color),
            );
        }
        if let Some(note) = &diag.note {
            report = report.with_note(note);
        }

        report
            .finish()
            .write((filename, Source::from(listing)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}
