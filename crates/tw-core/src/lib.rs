//! Core types for Taleweaver: scenes, choices, and the story graph.
//!
//! This crate defines the data model that the compiler produces and the
//! runtime engine walks. It is independent of the document format: you can
//! build a [`StoryGraph`] programmatically or decode one from the JSON
//! payload embedded in a generated story artifact.

/// Encoding and decoding of the embedded story payload.
pub mod artifact;
/// Error types used throughout the crate.
pub mod error;
/// The ordered, case-insensitively indexed scene graph.
pub mod graph;
/// Scene and choice types.
pub mod scene;

/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export the story graph.
pub use graph::StoryGraph;
/// Re-export scene types.
pub use scene::{Choice, Scene, parse_hex_color, scene_key};
