// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Text serialization of entities
//!
//! An entity serializes to one line per named component, `"<name> <data>"`,
//! where `data` is the component's own [`save`](crate::Component::save)
//! encoding. When the encoding is empty the line is just the name.
//! A [`WorldSnapshot`] bundles those lines for every entity and goes through
//! `serde_json` for whole-world persistence.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::component::ComponentId;
use crate::error::{EcsError, Result};
use crate::id::EntityId;
use crate::registry::ComponentRegistry;
use crate::world::World;

/// Current [`WorldSnapshot`] format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Join a component name and its encoding into one line.
pub fn component_line(name: &str, data: &str) -> String {
    if data.is_empty() {
        name.to_owned()
    } else {
        format!("{name} {data}")
    }
}

/// Split a line at its first space. A line without a space is all name.
/// A line ending in its first space carries nothing and yields `None`.
pub fn split_component_line(line: &str) -> Option<(&str, &str)> {
    match line.split_once(' ') {
        None => Some((line, "")),
        Some((_, "")) => None,
        Some(parts) => Some(parts),
    }
}

/// One entity inside a [`WorldSnapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub components: Vec<String>,
}

/// Serializable form of a whole world: entity names and component lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub version: u32,
    pub entities: Vec<EntitySnapshot>,
}

impl Default for WorldSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            entities: Vec::new(),
        }
    }
}

impl World {
    /// One line per named component of `entity`, in registration order.
    /// Unnamed components are skipped; a dead entity yields nothing.
    pub fn serialize_entity(&self, entity: EntityId) -> Vec<String> {
        let Some(record) = self.record(entity) else {
            return Vec::new();
        };

        let mut ids: Vec<ComponentId> = record.components().map(|(id, _)| id).collect();
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| {
                let name = self.registry().name_of(id)?;
                let data = self.get_by_id(entity, id)?.encode();
                Some(component_line(name, &data))
            })
            .collect()
    }

    /// Line for `entity`'s component called `name`, if it has one.
    pub fn serialize_component(&self, entity: EntityId, name: &str) -> Option<String> {
        let data = self.get_by_name(entity, name)?.encode();
        Some(component_line(name, &data))
    }

    /// Load `data` into `entity`'s component called `name`, creating the
    /// component first if needed. Returns false for a dead entity, an empty
    /// name or a name no type is registered under.
    pub fn deserialize_component(&mut self, entity: EntityId, name: &str, data: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        match self.access(entity, name) {
            Some(component) => {
                component.decode(data);
                true
            }
            None => {
                tracing::debug!(component = name, "cannot deserialize component");
                false
            }
        }
    }

    /// [`deserialize_component`](Self::deserialize_component) with the
    /// failure reason.
    pub fn try_deserialize_component(&mut self, entity: EntityId, name: &str, data: &str) -> Result<()> {
        if !self.contains(entity) {
            return Err(EcsError::InvalidEntity);
        }
        let Some(id) = self.registry().id_by_name(name) else {
            return Err(EcsError::UnknownComponentName(name.to_owned()));
        };
        match self.access_by_id(entity, id) {
            Some(component) => {
                component.decode(data);
                Ok(())
            }
            None => Err(EcsError::UnknownComponentName(name.to_owned())),
        }
    }

    /// Apply one `"<name> <data>"` line. A bare name loads an empty payload;
    /// a name followed only by the separator is ignored.
    pub fn deserialize_line(&mut self, entity: EntityId, line: &str) -> bool {
        match split_component_line(line) {
            Some((name, data)) => self.deserialize_component(entity, name, data),
            None => false,
        }
    }

    pub fn to_snapshot(&self) -> WorldSnapshot {
        let entities = self
            .entity_ids()
            .into_iter()
            .map(|id| EntitySnapshot {
                name: self.name(id).map(str::to_owned),
                components: self.serialize_entity(id),
            })
            .collect();
        WorldSnapshot {
            version: SNAPSHOT_VERSION,
            entities,
        }
    }

    /// Create one entity per snapshot entry and return their ids in order.
    /// Lines naming unknown components are skipped.
    pub fn load_snapshot(&mut self, snapshot: &WorldSnapshot) -> Result<Vec<EntityId>> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(EcsError::DeserializationError(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }

        let mut created = Vec::with_capacity(snapshot.entities.len());
        for entry in &snapshot.entities {
            let id = self.create_named(entry.name.as_deref().unwrap_or_default());
            for line in &entry.components {
                if !self.deserialize_line(id, line) {
                    tracing::warn!(line = line.as_str(), "skipping unknown component in snapshot");
                }
            }
            created.push(id);
        }
        Ok(created)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.to_snapshot())
            .map_err(|e| EcsError::SerializationError(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_snapshot())
            .map_err(|e| EcsError::SerializationError(e.to_string()))
    }

    /// Append the entities of a JSON snapshot to this world.
    pub fn load_json(&mut self, json: &str) -> Result<Vec<EntityId>> {
        let snapshot: WorldSnapshot = serde_json::from_str(json)
            .map_err(|e| EcsError::DeserializationError(e.to_string()))?;
        self.load_snapshot(&snapshot)
    }

    /// Build a new world over `registry` from a JSON snapshot.
    pub fn from_json(registry: Arc<ComponentRegistry>, json: &str) -> Result<World> {
        let mut world = World::with_registry(registry);
        world.load_json(json)?;
        Ok(world)
    }
}
