//! Render instructions produced by the engine.
//!
//! A [`Frame`] is everything a view needs to draw after one action. The
//! engine never draws anything itself; a [`View`] receives each frame.

use serde::Serialize;

use crate::save::SaveSlot;

/// One selectable choice in a rendered scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceView {
    /// Display label.
    pub text: String,
    /// Scene id navigated to when chosen.
    pub target: String,
    /// Whether this is the synthetic restart choice of a terminal scene.
    pub restart: bool,
}

/// A scene ready for display, with defaults already substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneView {
    /// Scene id in its original casing.
    pub title: String,
    /// Body markup.
    pub body: String,
    /// Icon glyph.
    pub icon: String,
    /// Accent color.
    pub color: String,
    /// Choices in document order, or the single restart choice.
    pub choices: Vec<ChoiceView>,
    /// End-of-story marker, set only for scenes without choices.
    pub terminal: Option<String>,
}

impl SceneView {
    /// Whether the scene ends the story.
    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }
}

/// Which overlay is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    /// Choosing a name for a new save.
    Save,
    /// Choosing a slot to load or delete.
    Load,
}

impl std::fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlayKind::Save => write!(f, "save"),
            OverlayKind::Load => write!(f, "load"),
        }
    }
}

/// An open overlay with the slot list it shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayView {
    /// Overlay mode.
    pub mode: OverlayKind,
    /// Save slots, most recent first.
    pub slots: Vec<SaveSlot>,
}

/// Tone of a transient status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// The action completed.
    Success,
    /// The action was rejected or failed.
    Error,
    /// Neutral information.
    Info,
}

/// A transient message about the last action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    /// Tone.
    pub kind: StatusKind,
    /// Message text.
    pub message: String,
}

impl Status {
    /// A success message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    /// An error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }

    /// An informational message.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            message: message.into(),
        }
    }
}

/// The render instruction for one engine transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Current scene, if a session has started.
    pub scene: Option<SceneView>,
    /// Open overlay, if any.
    pub overlay: Option<OverlayView>,
    /// Status of the action that produced this frame.
    pub status: Option<Status>,
}

impl Frame {
    /// Attach a status message.
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether the frame reports a failed action.
    pub fn is_error(&self) -> bool {
        matches!(&self.status, Some(s) if s.kind == StatusKind::Error)
    }
}

/// Receives frames from the engine.
pub trait View {
    /// Draw a frame.
    fn present(&mut self, frame: &Frame);
}

/// A view that keeps every frame it is given.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    /// Frames in the order they were presented.
    pub frames: Vec<Frame>,
}

impl RecordingView {
    /// The most recent frame.
    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl View for RecordingView {
    fn present(&mut self, frame: &Frame) {
        self.frames.push(frame.clone());
    }
}
