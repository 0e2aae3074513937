//! Error types for story compilation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for compilation.
pub type DslResult<T> = Result<T, DslError>;

/// Fatal compilation failures.
///
/// Problems that only skip part of a document are reported as warning
/// [`crate::Diagnostic`]s instead.
#[derive(Debug, Error)]
pub enum DslError {
    /// The input document does not exist.
    #[error("{} not found", .0.display())]
    SourceNotFound(PathBuf),

    /// The input document exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// The document path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// No heading-styled paragraph was found, so there is no story.
    #[error("no scenes found; check that scene titles use the Heading 1 style")]
    EmptyGraph,
}
