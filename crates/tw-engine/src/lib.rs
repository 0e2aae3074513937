//! Runtime navigation and persistence for Taleweaver stories.
//!
//! [`RuntimeEngine`] walks a compiled [`tw_core::StoryGraph`] one action at a
//! time, keeps save slots in an injected [`KeyValueStore`], and hands every
//! resulting [`Frame`] to a [`View`]. Nothing an action does can end the
//! session: failures become an error status on the frame.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod save;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::EngineConfig;
pub use engine::{Action, RuntimeEngine};
pub use error::{EngineError, EngineResult};
pub use frame::{
    ChoiceView, Frame, OverlayKind, OverlayView, RecordingView, SceneView, Status, StatusKind, View,
};
pub use save::{SaveSlot, SaveStore};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
