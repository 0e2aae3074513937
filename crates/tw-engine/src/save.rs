//! Save slots and the persisted save list.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::store::KeyValueStore;

/// A named bookmark of a scene.
///
/// `scene_id` is not checked against the story when saved, so a slot may
/// outlive the scene it points to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSlot {
    /// Unique id derived from the save time (Unix milliseconds).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Save time in Unix milliseconds.
    pub timestamp: i64,
    /// Scene the slot returns to.
    pub scene_id: String,
}

/// Formats a Unix-millisecond timestamp for display.
pub fn format_timestamp(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => millis.to_string(),
    }
}

/// Name given to a save without a user-supplied name.
pub fn default_slot_name(millis: i64) -> String {
    format!("AutoSave @ {}", format_timestamp(millis))
}

/// All save slots, most recent first.
///
/// Persisted as one JSON array under a single store key. Mutations return a
/// new list so the caller can commit it only after a successful write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveStore {
    slots: Vec<SaveSlot>,
}

impl SaveStore {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the list stored under `key`.
    ///
    /// Never fails: a read error, a missing value, or data that does not parse
    /// as a slot list all yield an empty list.
    pub fn read<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Self {
        let raw = match store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::new(),
            Err(e) => {
                warn!(key, error = %e, "cannot read save slots; treating as empty");
                return Self::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(slots) => slots,
            Err(e) => {
                warn!(key, error = %e, "malformed save slots; treating as empty");
                Self::new()
            }
        }
    }

    /// Writes the whole list under `key`.
    pub fn write<S: KeyValueStore + ?Sized>(&self, store: &mut S, key: &str) -> EngineResult<()> {
        let json = serde_json::to_string(self)?;
        store.set(key, json).map_err(|e| {
            warn!(key, error = %e, "cannot write save slots");
            EngineError::PersistenceWrite(e)
        })
    }

    /// All slots, most recent first.
    pub fn slots(&self) -> &[SaveSlot] {
        &self.slots
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether there are no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Finds a slot by id.
    pub fn find(&self, id: &str) -> Option<&SaveSlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    /// A copy of this list with `slot` in front.
    pub fn with_slot(&self, slot: SaveSlot) -> Self {
        let mut slots = Vec::with_capacity(self.slots.len() + 1);
        slots.push(slot);
        slots.extend(self.slots.iter().cloned());
        Self { slots }
    }

    /// A copy of this list without the slot `id`, or `None` if absent.
    pub fn without(&self, id: &str) -> Option<Self> {
        self.find(id)?;
        let slots = self.slots.iter().filter(|s| s.id != id).cloned().collect();
        Some(Self { slots })
    }

    /// A fresh slot id for a save made at `now_millis`.
    ///
    /// The id is the timestamp itself, bumped past the largest numeric id
    /// already in the list so two saves in the same millisecond stay unique.
    /// Stored ids come from outside, so an id at `i64::MAX` is stepped over
    /// rather than bumped.
    pub fn next_id(&self, now_millis: i64) -> String {
        let newest = self
            .slots
            .iter()
            .filter_map(|s| s.id.parse::<i64>().ok())
            .filter(|&id| id < i64::MAX)
            .max();
        let candidate = match newest {
            Some(newest) if newest >= now_millis => newest + 1,
            _ => now_millis,
        };
        if self.find(&candidate.to_string()).is_none() {
            return candidate.to_string();
        }
        // Only reachable when the candidate is i64::MAX and already taken.
        let mut suffix = 1u32;
        loop {
            let id = format!("{candidate}-{suffix}");
            if self.find(&id).is_none() {
                return id;
            }
            suffix += 1;
        }
    }
}
