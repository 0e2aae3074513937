//! Error types for the runtime engine.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by a single engine action.
///
/// None of these end a session; the engine turns them into an error status
/// on the next frame and leaves its state as it was.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The story has no scenes to start from.
    #[error("story has no scenes")]
    EmptyGraph,

    /// A navigation target does not name a scene.
    #[error("scene '{0}' not found")]
    SceneNotFound(String),

    /// Saving requires a current scene.
    #[error("cannot save: no scene is active")]
    NoActiveScene,

    /// No save slot has this id.
    #[error("save slot '{0}' not found")]
    SlotNotFound(String),

    /// Writing the save list failed; nothing was changed.
    #[error("could not save game: storage is full or restricted ({0})")]
    PersistenceWrite(#[source] StoreError),

    /// The save list could not be encoded.
    #[error("could not encode save slots: {0}")]
    Encode(#[from] serde_json::Error),
}
