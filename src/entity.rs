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

//! Entity records and entity proxies
//!
//! An entity is nothing but a record in the world's entity directory that
//! maps component types to the keys of its components. [`EntityRef`] and
//! [`EntityMut`] pair a world borrow with an [`EntityId`] and forward every
//! operation to the world; they are views, not storage.

use rustc_hash::FxHashMap;

use crate::component::{Component, ComponentData, ComponentId, ComponentSet};
use crate::id::{ComponentKey, EntityId};
use crate::slot_map::Handle;
use crate::storage::Stored;
use crate::world::World;

/// Directory entry for one entity.
#[derive(Clone, Debug, Default)]
pub struct EntityRecord {
    pub(crate) components: FxHashMap<ComponentId, ComponentKey>,
    pub(crate) name: Option<String>,
}

impl EntityRecord {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Key of this entity's component of type `id`.
    pub fn component_key(&self, id: ComponentId) -> Option<ComponentKey> {
        self.components.get(&id).copied()
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.components.contains_key(&id)
    }

    /// `(type, key)` pairs in no particular order.
    pub fn components(&self) -> impl Iterator<Item = (ComponentId, ComponentKey)> + '_ {
        self.components.iter().map(|(&id, &key)| (id, key))
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Shared view of one entity.
#[derive(Clone, Copy)]
pub struct EntityRef<'w> {
    world: &'w World,
    id: EntityId,
}

impl<'w> EntityRef<'w> {
    pub(crate) fn new(world: &'w World, id: EntityId) -> Self {
        Self { world, id }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn world(&self) -> &'w World {
        self.world
    }

    pub fn is_valid(&self) -> bool {
        self.world.contains(self.id)
    }

    pub fn name(&self) -> Option<&'w str> {
        self.world.name(self.id)
    }

    pub fn get<T: Component>(&self) -> Option<&'w T> {
        self.world.get::<T>(self.id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&'w dyn ComponentData> {
        self.world.get_by_name(self.id, name)
    }

    pub fn handle<T: Component>(&self) -> Option<Handle<'w, ComponentKey, Stored<T>>> {
        self.world.component_handle::<T>(self.id)
    }

    pub fn has<T: Component>(&self) -> bool {
        self.world.has::<T>(self.id)
    }

    pub fn has_all<S: ComponentSet>(&self) -> bool {
        self.world.has_all::<S>(self.id)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.world.has_name(self.id, name)
    }

    pub fn has_names(&self, names: &[&str]) -> bool {
        self.world.has_names(self.id, names)
    }

    /// Number of components owned.
    pub fn len(&self) -> usize {
        self.world.component_count(self.id)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered names of the owned components; unnamed ones are omitted.
    pub fn component_names(&self) -> Vec<&'static str> {
        self.world.component_names(self.id)
    }

    pub fn serialize(&self) -> Vec<String> {
        self.world.serialize_entity(self.id)
    }
}

impl std::fmt::Debug for EntityRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRef")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("components", &self.component_names())
            .finish()
    }
}

/// Exclusive view of one entity.
///
/// Mutating methods return `&mut Self` so calls chain:
///
/// ```ignore
/// world.spawn().assign(Position { x: 1.0, y: 2.0 }).assign(Velocity::default());
/// ```
pub struct EntityMut<'w> {
    world: &'w mut World,
    id: EntityId,
}

impl<'w> EntityMut<'w> {
    pub(crate) fn new(world: &'w mut World, id: EntityId) -> Self {
        Self { world, id }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn world(&self) -> &World {
        self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.world
    }

    pub fn as_readonly(&self) -> EntityRef<'_> {
        EntityRef::new(self.world, self.id)
    }

    pub fn is_valid(&self) -> bool {
        self.world.contains(self.id)
    }

    pub fn name(&self) -> Option<&str> {
        self.world.name(self.id)
    }

    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.world.set_name(self.id, name);
        self
    }

    /// Set component `T`, creating it or overwriting it in place.
    pub fn assign<T: Component>(&mut self, value: T) -> &mut Self {
        self.world.assign(self.id, value);
        self
    }

    pub fn get<T: Component>(&self) -> Option<&T> {
        self.world.get::<T>(self.id)
    }

    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.world.get_mut::<T>(self.id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&dyn ComponentData> {
        self.world.get_by_name(self.id, name)
    }

    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut dyn ComponentData> {
        self.world.get_by_name_mut(self.id, name)
    }

    /// Component `T`, default-constructed first if missing.
    pub fn at<T: Component>(&mut self) -> Option<&mut T> {
        self.world.at::<T>(self.id)
    }

    /// Named component, default-constructed first if missing.
    pub fn access(&mut self, name: &str) -> Option<&mut dyn ComponentData> {
        self.world.access(self.id, name)
    }

    pub fn has<T: Component>(&self) -> bool {
        self.world.has::<T>(self.id)
    }

    pub fn has_all<S: ComponentSet>(&self) -> bool {
        self.world.has_all::<S>(self.id)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.world.has_name(self.id, name)
    }

    pub fn has_names(&self, names: &[&str]) -> bool {
        self.world.has_names(self.id, names)
    }

    pub fn len(&self) -> usize {
        self.world.component_count(self.id)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remove<T: Component>(&mut self) -> Option<T> {
        self.world.remove::<T>(self.id)
    }

    pub fn remove_by_name(&mut self, name: &str) -> bool {
        self.world.remove_by_name(self.id, name)
    }

    pub fn remove_all<S: ComponentSet>(&mut self) -> usize {
        self.world.remove_all::<S>(self.id)
    }

    /// Remove every component; the entity stays alive.
    pub fn clear(&mut self) -> &mut Self {
        self.world.clear_components(self.id);
        self
    }

    /// Remove every component and free the entity.
    pub fn destroy(self) -> bool {
        self.world.destroy(self.id)
    }

    /// Clone into a new entity of the same world.
    pub fn clone_entity(&mut self, name: &str) -> EntityId {
        self.world.clone_entity(self.id, name)
    }

    /// Clone into a new entity of `target`.
    pub fn clone_into(&self, target: &mut World, name: &str) -> EntityId {
        self.world.clone_into(self.id, target, name)
    }

    pub fn serialize(&self) -> Vec<String> {
        self.world.serialize_entity(self.id)
    }

    pub fn deserialize_component(&mut self, name: &str, data: &str) -> &mut Self {
        self.world.deserialize_component(self.id, name, data);
        self
    }

    /// Apply one `"<name> <data>"` line.
    pub fn deserialize(&mut self, line: &str) -> &mut Self {
        self.world.deserialize_line(self.id, line);
        self
    }

    pub fn deserialize_all<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.world.deserialize_line(self.id, line.as_ref());
        }
        self
    }
}

impl std::fmt::Debug for EntityMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_readonly().fmt(f)
    }
}
