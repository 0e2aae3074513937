//! The runtime session state machine.
//!
//! `RuntimeEngine` owns a decoded [`StoryGraph`], the session state and the
//! injected store and clock. Every action runs to completion and produces a
//! [`Frame`]; a failed action leaves the state exactly as it was (loading is
//! the one exception, see [`RuntimeEngine::load_game`]).

use tracing::debug;

use tw_core::{Scene, StoryGraph};

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::frame::{ChoiceView, Frame, OverlayKind, OverlayView, SceneView, Status, View};
use crate::save::{SaveSlot, SaveStore, default_slot_name};
use crate::store::KeyValueStore;

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Begin at the entry scene.
    Start,
    /// Follow a choice to the named scene.
    Navigate(String),
    /// Open the save or load overlay.
    OpenOverlay(OverlayKind),
    /// Close any overlay.
    CloseOverlay,
    /// Save the current scene, optionally under a name.
    Save(Option<String>),
    /// Load the slot with this id.
    Load(String),
    /// Delete the slot with this id.
    Delete(String),
}

#[derive(Debug, Default)]
struct SessionState {
    current_scene: Option<String>,
    overlay: Option<OverlayKind>,
    slots: SaveStore,
}

/// An interactive story session.
pub struct RuntimeEngine<S, C = SystemClock> {
    graph: StoryGraph,
    config: EngineConfig,
    store: S,
    clock: C,
    state: SessionState,
}

impl<S: KeyValueStore> RuntimeEngine<S> {
    /// Create a session over `graph`, persisting saves in `store`.
    pub fn new(graph: StoryGraph, store: S) -> Self {
        let config = EngineConfig::default();
        let slots = SaveStore::read(&store, &config.save_key);
        Self {
            graph,
            config,
            store,
            clock: SystemClock,
            state: SessionState {
                slots,
                ..SessionState::default()
            },
        }
    }
}

impl<S: KeyValueStore, C: Clock> RuntimeEngine<S, C> {
    /// Replace the configuration. The slot list is re-read under the new key.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.state.slots = SaveStore::read(&self.store, &config.save_key);
        self.config = config;
        self
    }

    /// Replace the clock.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> RuntimeEngine<S, C2> {
        RuntimeEngine {
            graph: self.graph,
            config: self.config,
            store: self.store,
            clock,
            state: self.state,
        }
    }

    /// The story being played.
    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The persistent store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The persistent store, mutably.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Id of the current scene in its original casing.
    pub fn current_scene(&self) -> Option<&str> {
        self.state.current_scene.as_deref()
    }

    /// The open overlay.
    pub fn overlay(&self) -> Option<OverlayKind> {
        self.state.overlay
    }

    /// Save slots as last read from or written to the store.
    pub fn slots(&self) -> &[SaveSlot] {
        self.state.slots.slots()
    }

    /// Begin at the entry scene.
    pub fn start(&mut self) -> EngineResult<Frame> {
        let entry = self.graph.entry_scene().ok_or(EngineError::EmptyGraph)?;
        debug!(scene = %entry.id, "session started");
        self.state.current_scene = Some(entry.id.clone());
        self.state.overlay = None;
        Ok(self.frame())
    }

    /// Move to the scene named `target` (case-insensitive, trimmed).
    ///
    /// Closes any overlay. On failure nothing changes.
    pub fn navigate_to(&mut self, target: &str) -> EngineResult<Frame> {
        let scene = self
            .graph
            .get(target)
            .ok_or_else(|| EngineError::SceneNotFound(target.trim().to_string()))?;
        debug!(scene = %scene.id, "navigated");
        self.state.current_scene = Some(scene.id.clone());
        self.state.overlay = None;
        Ok(self.frame())
    }

    /// Open an overlay, refreshing the slot list from the store.
    pub fn open_overlay(&mut self, mode: OverlayKind) -> Frame {
        self.state.slots = self.read_slots();
        self.state.overlay = Some(mode);
        debug!(%mode, slots = self.state.slots.len(), "overlay opened");
        self.frame()
    }

    /// Close any overlay. Closing twice is harmless.
    pub fn close_overlay(&mut self) -> Frame {
        self.state.overlay = None;
        self.frame()
    }

    /// Save the current scene.
    ///
    /// A blank or missing name becomes `AutoSave @ <timestamp>`. The store is
    /// re-read before the new slot is added, and the session's slot list and
    /// overlay change only once the write has succeeded.
    pub fn save_game(&mut self, name: Option<&str>) -> EngineResult<Frame> {
        let scene_id = self
            .state
            .current_scene
            .clone()
            .ok_or(EngineError::NoActiveScene)?;

        let now = self.clock.now().timestamp_millis();
        let saved = self.read_slots();
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => default_slot_name(now),
        };
        let slot = SaveSlot {
            id: saved.next_id(now),
            name,
            timestamp: now,
            scene_id,
        };

        let updated = saved.with_slot(slot.clone());
        updated.write(&mut self.store, &self.config.save_key)?;
        debug!(slot = %slot.id, scene = %slot.scene_id, "game saved");

        self.state.slots = updated;
        self.state.overlay = None;
        Ok(self
            .frame()
            .with_status(Status::success(format!("Game saved as '{}'!", slot.name))))
    }

    /// Load a save slot.
    ///
    /// When the slot exists the overlay is closed before navigating, so a
    /// slot pointing at a missing scene fails with the overlay already
    /// closed and the current scene unchanged.
    pub fn load_game(&mut self, slot_id: &str) -> EngineResult<Frame> {
        let saved = self.read_slots();
        let slot = saved
            .find(slot_id)
            .cloned()
            .ok_or_else(|| EngineError::SlotNotFound(slot_id.to_string()))?;
        self.state.slots = saved;
        self.state.overlay = None;
        let frame = self.navigate_to(&slot.scene_id)?;
        debug!(slot = %slot.id, "game loaded");
        Ok(frame.with_status(Status::success(format!("Game loaded: '{}'", slot.name))))
    }

    /// Delete a save slot and persist the reduced list.
    pub fn delete_slot(&mut self, slot_id: &str) -> EngineResult<Frame> {
        let saved = self.read_slots();
        let reduced = saved
            .without(slot_id)
            .ok_or_else(|| EngineError::SlotNotFound(slot_id.to_string()))?;
        reduced.write(&mut self.store, &self.config.save_key)?;
        debug!(slot = slot_id, "save slot deleted");
        self.state.slots = reduced;
        Ok(self.frame().with_status(Status::info("Save slot deleted.")))
    }

    /// Apply one action. Errors become an error status on the frame.
    pub fn step(&mut self, action: Action) -> Frame {
        let result = match action {
            Action::Start => self.start(),
            Action::Navigate(target) => self.navigate_to(&target),
            Action::OpenOverlay(mode) => Ok(self.open_overlay(mode)),
            Action::CloseOverlay => Ok(self.close_overlay()),
            Action::Save(name) => self.save_game(name.as_deref()),
            Action::Load(id) => self.load_game(&id),
            Action::Delete(id) => self.delete_slot(&id),
        };
        result.unwrap_or_else(|e| {
            debug!(error = %e, "action rejected");
            self.frame().with_status(Status::error(e.to_string()))
        })
    }

    /// Apply one action and present the result.
    pub fn dispatch<V: View + ?Sized>(&mut self, action: Action, view: &mut V) -> Frame {
        let frame = self.step(action);
        view.present(&frame);
        frame
    }

    /// Render the current state without changing it.
    pub fn frame(&self) -> Frame {
        let scene = self
            .state
            .current_scene
            .as_deref()
            .and_then(|id| self.graph.get(id))
            .map(|scene| self.scene_view(scene));
        let overlay = self.state.overlay.map(|mode| OverlayView {
            mode,
            slots: self.state.slots.slots().to_vec(),
        });
        Frame {
            scene,
            overlay,
            status: None,
        }
    }

    fn scene_view(&self, scene: &Scene) -> SceneView {
        let (choices, terminal) = if scene.is_terminal() {
            let entry = self
                .graph
                .entry_scene()
                .map_or_else(|| scene.id.clone(), |s| s.id.clone());
            let restart = ChoiceView {
                text: self.config.restart_label.clone(),
                target: entry,
                restart: true,
            };
            (vec![restart], Some(self.config.end_marker.clone()))
        } else {
            let choices = scene
                .choices
                .iter()
                .map(|c| ChoiceView {
                    text: c.text.clone(),
                    target: c.next.clone(),
                    restart: false,
                })
                .collect();
            (choices, None)
        };

        SceneView {
            title: scene.id.clone(),
            body: scene.text.clone(),
            icon: scene
                .icon
                .clone()
                .unwrap_or_else(|| self.config.default_icon.clone()),
            color: scene
                .color
                .clone()
                .unwrap_or_else(|| self.config.default_color.clone()),
            choices,
            terminal,
        }
    }

    fn read_slots(&self) -> SaveStore {
        SaveStore::read(&self.store, &self.config.save_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::frame::{RecordingView, StatusKind};
    use crate::store::MemoryStore;
    use tw_core::Choice;

    const NOW: i64 = 1_700_000_000_000;
    const DEFAULT_KEY: &str = crate::config::DEFAULT_SAVE_KEY;

    fn scene(id: &str, text: &str, choices: &[(&str, &str)]) -> Scene {
        let mut scene = Scene::new(id);
        scene.text = format!("<p>{text}</p>");
        scene.choices = choices.iter().map(|(t, n)| Choice::new(*t, *n)).collect();
        scene
    }

    fn story() -> StoryGraph {
        let mut graph = StoryGraph::new();
        let mut start = scene("Start", "Hello", &[("Go", "Forest"), ("Lost", "End")]);
        start.icon = Some("🌅".to_string());
        graph.insert(start).unwrap();
        let mut forest = scene("Forest", "Trees", &[("Deeper", "Cave")]);
        forest.color = Some("#00FF00".to_string());
        graph.insert(forest).unwrap();
        graph.insert(scene("Cave", "Dark", &[])).unwrap();
        graph
    }

    fn engine() -> RuntimeEngine<MemoryStore, FixedClock> {
        RuntimeEngine::new(story(), MemoryStore::new()).with_clock(FixedClock::at_millis(NOW))
    }

    fn started() -> RuntimeEngine<MemoryStore, FixedClock> {
        let mut engine = engine();
        engine.start().unwrap();
        engine
    }

    fn status(frame: &Frame) -> (StatusKind, &str) {
        let status = frame.status.as_ref().unwrap();
        (status.kind, status.message.as_str())
    }

    #[test]
    fn start_renders_entry_scene() {
        let mut engine = engine();
        assert_eq!(engine.current_scene(), None);
        let frame = engine.start().unwrap();
        let view = frame.scene.unwrap();
        assert_eq!(view.title, "Start");
        assert_eq!(view.body, "<p>Hello</p>");
        assert_eq!(view.icon, "🌅");
        assert_eq!(view.color, "#4ECDC4");
        assert_eq!(view.choices.len(), 2);
        assert!(!view.is_terminal());
        assert_eq!(engine.current_scene(), Some("Start"));
    }

    #[test]
    fn start_on_empty_graph_fails() {
        let mut engine = RuntimeEngine::new(StoryGraph::new(), MemoryStore::new());
        assert!(matches!(engine.start(), Err(EngineError::EmptyGraph)));
        let frame = engine.step(Action::Start);
        assert!(frame.is_error());
        assert!(frame.scene.is_none());
    }

    #[test]
    fn navigation_is_case_insensitive() {
        let mut engine = started();
        let frame = engine.navigate_to("  forest ").unwrap();
        assert_eq!(engine.current_scene(), Some("Forest"));
        let view = frame.scene.unwrap();
        assert_eq!(view.title, "Forest");
        assert_eq!(view.icon, "💠");
        assert_eq!(view.color, "#00FF00");
    }

    #[test]
    fn missing_target_leaves_state_unchanged() {
        let mut engine = started();
        let err = engine.navigate_to("End").unwrap_err();
        assert!(matches!(err, EngineError::SceneNotFound(ref id) if id == "End"));
        assert_eq!(engine.current_scene(), Some("Start"));

        let frame = engine.step(Action::Navigate("End".to_string()));
        assert_eq!(status(&frame), (StatusKind::Error, "scene 'End' not found"));
        assert_eq!(frame.scene.unwrap().title, "Start");
    }

    #[test]
    fn terminal_scene_offers_restart() {
        let mut engine = started();
        let view = engine.navigate_to("Cave").unwrap().scene.unwrap();
        assert_eq!(view.terminal.as_deref(), Some("[End of Story]"));
        assert_eq!(view.choices.len(), 1);
        assert_eq!(view.choices[0].text, "Start Over");
        assert_eq!(view.choices[0].target, "Start");
        assert!(view.choices[0].restart);
        assert!(engine.graph().get("Cave").unwrap().choices.is_empty());

        let target = view.choices[0].target.clone();
        engine.navigate_to(&target).unwrap();
        assert_eq!(engine.current_scene(), Some("Start"));
    }

    #[test]
    fn overlay_does_not_move_scene() {
        let mut engine = started();
        let frame = engine.open_overlay(OverlayKind::Load);
        assert_eq!(frame.overlay.unwrap().mode, OverlayKind::Load);
        assert_eq!(engine.current_scene(), Some("Start"));

        engine.close_overlay();
        let frame = engine.close_overlay();
        assert!(frame.overlay.is_none());
        assert_eq!(engine.overlay(), None);
    }

    #[test]
    fn navigation_closes_overlay() {
        let mut engine = started();
        engine.open_overlay(OverlayKind::Save);
        engine.navigate_to("Forest").unwrap();
        assert_eq!(engine.overlay(), None);
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut engine = started();
        engine.navigate_to("Forest").unwrap();
        engine.navigate_to("cave").unwrap();
        engine.open_overlay(OverlayKind::Save);
        let frame = engine.save_game(None).unwrap();
        assert_eq!(
            status(&frame),
            (
                StatusKind::Success,
                "Game saved as 'AutoSave @ 2023-11-14 22:13:20 UTC'!"
            )
        );
        assert!(frame.overlay.is_none());

        let slot = engine.slots()[0].clone();
        assert_eq!(slot.scene_id, "Cave");
        assert_eq!(slot.id, NOW.to_string());
        assert_eq!(slot.timestamp, NOW);

        engine.start().unwrap();
        engine.open_overlay(OverlayKind::Load);
        let frame = engine.load_game(&slot.id).unwrap();
        assert_eq!(engine.current_scene(), Some("Cave"));
        assert_eq!(engine.overlay(), None);
        assert_eq!(
            status(&frame),
            (
                StatusKind::Success,
                "Game loaded: 'AutoSave @ 2023-11-14 22:13:20 UTC'"
            )
        );
    }

    #[test]
    fn save_uses_trimmed_name() {
        let mut engine = started();
        let frame = engine.save_game(Some("  Before the cave ")).unwrap();
        assert_eq!(
            status(&frame),
            (StatusKind::Success, "Game saved as 'Before the cave'!")
        );
        engine.save_game(Some("   ")).unwrap();
        assert!(engine.slots()[0].name.starts_with("AutoSave @ "));
    }

    #[test]
    fn save_without_scene_is_rejected() {
        let mut engine = engine();
        assert!(matches!(
            engine.save_game(Some("x")),
            Err(EngineError::NoActiveScene)
        ));
        assert!(engine.store().raw(DEFAULT_KEY).is_none());
    }

    #[test]
    fn saves_are_most_recent_first_with_unique_ids() {
        let mut engine = started();
        engine.save_game(Some("one")).unwrap();
        engine.save_game(Some("two")).unwrap();
        engine.clock().set(chrono::DateTime::from_timestamp_millis(NOW + 5000).unwrap());
        engine.save_game(Some("three")).unwrap();

        let names: Vec<_> = engine.slots().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["three", "two", "one"]);
        let ids: Vec<_> = engine.slots().iter().map(|s| s.id.clone()).collect();
        assert_eq!(
            ids,
            [
                (NOW + 5000).to_string(),
                (NOW + 1).to_string(),
                NOW.to_string()
            ]
        );
    }

    #[test]
    fn save_rereads_store() {
        let mut engine = started();
        engine.save_game(Some("mine")).unwrap();

        // Another session writes to the same store.
        let foreign = SaveStore::read(engine.store(), DEFAULT_KEY).with_slot(SaveSlot {
            id: "9".to_string(),
            name: "theirs".to_string(),
            timestamp: 9,
            scene_id: "Forest".to_string(),
        });
        foreign.write(engine.store_mut(), DEFAULT_KEY).unwrap();

        engine.save_game(Some("again")).unwrap();
        let names: Vec<_> = engine.slots().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["again", "theirs", "mine"]);
    }

    #[test]
    fn failed_write_changes_nothing() {
        let mut engine = started();
        engine.save_game(Some("kept")).unwrap();
        engine.open_overlay(OverlayKind::Save);
        engine.store_mut().set_fail_writes(true);

        let frame = engine.step(Action::Save(Some("lost".to_string())));
        assert!(frame.is_error());
        assert!(
            frame
                .status
                .as_ref()
                .unwrap()
                .message
                .starts_with("could not save game")
        );
        assert_eq!(engine.slots().len(), 1);
        assert_eq!(engine.slots()[0].name, "kept");
        assert_eq!(engine.overlay(), Some(OverlayKind::Save));

        let slot_id = engine.slots()[0].id.clone();
        assert!(engine.delete_slot(&slot_id).is_err());
        assert_eq!(engine.slots().len(), 1);
        engine.store_mut().set_fail_writes(false);
        assert_eq!(SaveStore::read(engine.store(), DEFAULT_KEY).len(), 1);
    }

    #[test]
    fn unparseable_store_lists_no_slots() {
        let store = MemoryStore::new().with_value(DEFAULT_KEY, "{{{ definitely not json");
        let mut engine = RuntimeEngine::new(story(), store);
        assert!(engine.slots().is_empty());
        engine.start().unwrap();
        let frame = engine.open_overlay(OverlayKind::Load);
        assert!(frame.overlay.unwrap().slots.is_empty());

        engine.save_game(Some("fresh")).unwrap();
        assert_eq!(SaveStore::read(engine.store(), DEFAULT_KEY).len(), 1);
    }

    #[test]
    fn save_beside_largest_possible_slot_id() {
        let store = MemoryStore::new().with_value(
            DEFAULT_KEY,
            r#"[{"id":"9223372036854775807","name":"x","timestamp":1,"sceneId":"Start"}]"#,
        );
        let mut engine =
            RuntimeEngine::new(story(), store).with_clock(FixedClock::at_millis(NOW));
        engine.start().unwrap();

        let frame = engine.step(Action::Save(Some("mine".to_string())));
        assert_eq!(status(&frame).0, StatusKind::Success);
        let slots = engine.slots();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].name, "mine");
        assert_eq!(slots[0].id, NOW.to_string());
        assert_ne!(slots[0].id, slots[1].id);
    }

    #[test]
    fn read_failure_lists_no_slots() {
        let mut store = MemoryStore::new().with_value(DEFAULT_KEY, "[]");
        store.set_fail_reads(true);
        let mut engine = RuntimeEngine::new(story(), store);
        engine.start().unwrap();
        let frame = engine.open_overlay(OverlayKind::Load);
        assert!(frame.overlay.unwrap().slots.is_empty());
    }

    #[test]
    fn delete_missing_slot_is_reported() {
        let mut engine = started();
        engine.save_game(Some("keep")).unwrap();
        let before = engine.store().raw(DEFAULT_KEY).map(str::to_string);

        let err = engine.delete_slot("nonexistent").unwrap_err();
        assert!(matches!(err, EngineError::SlotNotFound(ref id) if id == "nonexistent"));
        assert_eq!(engine.store().raw(DEFAULT_KEY).map(str::to_string), before);
        assert_eq!(engine.slots().len(), 1);
    }

    #[test]
    fn delete_removes_slot() {
        let mut engine = started();
        engine.save_game(Some("gone")).unwrap();
        let id = engine.slots()[0].id.clone();
        engine.open_overlay(OverlayKind::Load);

        let frame = engine.delete_slot(&id).unwrap();
        assert_eq!(status(&frame), (StatusKind::Info, "Save slot deleted."));
        assert!(frame.overlay.unwrap().slots.is_empty());
        assert!(SaveStore::read(engine.store(), DEFAULT_KEY).is_empty());
    }

    #[test]
    fn load_missing_slot_changes_nothing() {
        let mut engine = started();
        engine.open_overlay(OverlayKind::Load);
        let frame = engine.step(Action::Load("42".to_string()));
        assert_eq!(
            status(&frame),
            (StatusKind::Error, "save slot '42' not found")
        );
        assert_eq!(engine.overlay(), Some(OverlayKind::Load));
        assert_eq!(engine.current_scene(), Some("Start"));
    }

    #[test]
    fn load_of_vanished_scene_fails_gracefully() {
        let stale = serde_json::json!([{
            "id": "1",
            "name": "old",
            "timestamp": 1,
            "sceneId": "Deleted Scene",
        }]);
        let store = MemoryStore::new().with_value(DEFAULT_KEY, stale.to_string());
        let mut engine = RuntimeEngine::new(story(), store);
        engine.start().unwrap();
        engine.open_overlay(OverlayKind::Load);

        let frame = engine.step(Action::Load("1".to_string()));
        assert_eq!(
            status(&frame),
            (StatusKind::Error, "scene 'Deleted Scene' not found")
        );
        assert_eq!(engine.current_scene(), Some("Start"));
        assert_eq!(engine.overlay(), None);
    }

    #[test]
    fn custom_config_applies() {
        let config = EngineConfig::default()
            .with_save_key("other")
            .with_default_icon("*")
            .with_restart_label("Again")
            .with_end_marker("~ fin ~");
        let mut engine = RuntimeEngine::new(story(), MemoryStore::new()).with_config(config);
        let view = engine.navigate_to("Cave").unwrap().scene.unwrap();
        assert_eq!(view.icon, "*");
        assert_eq!(view.choices[0].text, "Again");
        assert_eq!(view.terminal.as_deref(), Some("~ fin ~"));

        engine.save_game(None).unwrap();
        assert!(engine.store().raw("other").is_some());
        assert!(engine.store().raw(DEFAULT_KEY).is_none());
    }

    #[test]
    fn dispatch_presents_every_frame() {
        let mut engine = engine();
        let mut view = RecordingView::default();
        engine.dispatch(Action::Start, &mut view);
        engine.dispatch(Action::Navigate("Forest".to_string()), &mut view);
        engine.dispatch(Action::Navigate("Nowhere".to_string()), &mut view);
        engine.dispatch(Action::OpenOverlay(OverlayKind::Save), &mut view);
        engine.dispatch(Action::Save(Some("here".to_string())), &mut view);
        engine.dispatch(Action::CloseOverlay, &mut view);

        assert_eq!(view.frames.len(), 6);
        assert!(view.frames[2].is_error());
        assert_eq!(view.frames[2].scene.as_ref().unwrap().title, "Forest");
        assert!(view.frames[3].overlay.is_some());
        assert_eq!(view.frames[4].status.as_ref().unwrap().kind, StatusKind::Success);
        assert!(view.last().unwrap().overlay.is_none());
    }
}
