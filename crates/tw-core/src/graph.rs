use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, CoreResult};
use crate::scene::{Scene, scene_key};

/// The compiled story: scenes in document order with a case-insensitive index.
///
/// The first scene is the entry scene. A graph never changes after it has
/// been compiled or decoded.
#[derive(Debug, Clone, Default)]
pub struct StoryGraph {
    scenes: Vec<Scene>,
    by_key: HashMap<String, usize>,
}

impl StoryGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a scene. Fails if a scene with the same id (ignoring case)
    /// is already present.
    pub fn insert(&mut self, scene: Scene) -> CoreResult<()> {
        let key = scene.key();
        if self.by_key.contains_key(&key) {
            return Err(CoreError::DuplicateScene(scene.id));
        }
        self.by_key.insert(key, self.scenes.len());
        self.scenes.push(scene);
        Ok(())
    }

    /// Finds a scene by id (case-insensitive, surrounding whitespace ignored).
    pub fn get(&self, id: &str) -> Option<&Scene> {
        self.by_key
            .get(&scene_key(id))
            .and_then(|&index| self.scenes.get(index))
    }

    /// Whether a scene with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.by_key.contains_key(&scene_key(id))
    }

    /// The first scene in document order.
    pub fn entry_scene(&self) -> Option<&Scene> {
        self.scenes.first()
    }

    /// All scenes in document order.
    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter()
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether the graph has no scenes.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Total number of choices across all scenes.
    pub fn choice_count(&self) -> usize {
        self.scenes.iter().map(|s| s.choices.len()).sum()
    }

    /// Choices whose target does not resolve to a scene, as `(scene, target)` pairs.
    ///
    /// Unresolved targets are legal; this is reporting only.
    pub fn unresolved_targets(&self) -> Vec<(&str, &str)> {
        self.scenes
            .iter()
            .flat_map(|scene| {
                scene
                    .choices
                    .iter()
                    .filter(|c| !self.contains(&c.next))
                    .map(move |c| (scene.id.as_str(), c.next.as_str()))
            })
            .collect()
    }
}

impl PartialEq for StoryGraph {
    fn eq(&self, other: &Self) -> bool {
        self.scenes == other.scenes
    }
}

impl Eq for StoryGraph {}

impl Serialize for StoryGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.scenes.len()))?;
        for scene in &self.scenes {
            map.serialize_entry(&scene.id, scene)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StoryGraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StoryGraphVisitor)
    }
}

struct StoryGraphVisitor;

impl<'de> Visitor<'de> for StoryGraphVisitor {
    type Value = StoryGraph;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of scene ids to scene records")
    }

    // Entries are visited in source order, which keeps the entry scene first.
    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut graph = StoryGraph::new();
        while let Some((id, mut scene)) = access.next_entry::<String, Scene>()? {
            scene.id = id;
            graph.insert(scene).map_err(serde::de::Error::custom)?;
        }
        Ok(graph)
    }
}
