/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when building or decoding a story graph.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A scene with the same id (compared case-insensitively) already exists.
    #[error("scene already exists: \"{0}\"")]
    DuplicateScene(String),

    /// The embedded payload is not valid story JSON.
    #[error("invalid story data: {0}")]
    Json(#[from] serde_json::Error),

    /// The document does not contain an embedded story payload.
    #[error("no embedded story data found (expected a <script id=\"{0}\"> element)")]
    MissingPayload(&'static str),

    /// The artifact template has no slot for the story payload.
    #[error("template is missing the story data placeholder {0}")]
    MissingPlaceholder(&'static str),
}
