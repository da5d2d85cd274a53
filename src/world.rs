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

//! World: entity directory plus one store per component type

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use smallvec::SmallVec;

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::component::{Component, ComponentData, ComponentId, ComponentSet};
use crate::config::WorldConfig;
use crate::entity::{EntityMut, EntityRecord, EntityRef};
use crate::error::{EcsError, Result};
use crate::id::{ComponentKey, EntityId};
use crate::registry::ComponentRegistry;
use crate::slot_map::{Handle, SlotMap};
use crate::storage::{ComponentStore, ErasedStore, StoreToken, Stored};

type StoreTable = Vec<Option<Box<dyn ErasedStore>>>;

/// Store for `id`, cloned from the registry prototype on first touch.
fn store_slot<'s>(
    stores: &'s mut StoreTable,
    registry: &ComponentRegistry,
    capacity: usize,
    id: ComponentId,
) -> Option<&'s mut (dyn ErasedStore + 'static)> {
    let index = id.index();
    if index >= stores.len() {
        if index >= registry.len() {
            return None;
        }
        stores.resize_with(index + 1, || None);
    }

    let slot = &mut stores[index];
    if slot.is_none() {
        let mut store = registry.instantiate(id)?;
        store.reserve(capacity);
        *slot = Some(store);
    }
    slot.as_deref_mut()
}

/// Central ECS world
///
/// Owns one entity directory and one store per registered component type.
/// Worlds built from the same registry share type ids but never data.
pub struct World {
    registry: Arc<ComponentRegistry>,
    config: WorldConfig,

    /// Entity directory
    entities: SlotMap<EntityId, EntityRecord>,

    /// Unique entity names
    names: AHashMap<String, EntityId>,

    /// Stores indexed by `ComponentId`
    stores: StoreTable,
}

impl World {
    /// Create a world backed by the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry(ComponentRegistry::global())
    }

    /// Create a world backed by `registry`.
    pub fn with_registry(registry: Arc<ComponentRegistry>) -> Self {
        Self::with_config(registry, WorldConfig::default())
    }

    pub fn with_config(registry: Arc<ComponentRegistry>, config: WorldConfig) -> Self {
        let mut world = Self {
            registry,
            config,
            entities: SlotMap::with_capacity(config.entity_capacity),
            names: AHashMap::new(),
            stores: Vec::new(),
        };
        world.refresh_stores();
        world
    }

    /// Create stores for every registered type this world does not have yet.
    ///
    /// Stores are also created lazily on first use, so this only matters
    /// for callers that inspect stores by id.
    pub fn refresh_stores(&mut self) {
        for index in 0..self.registry.len() {
            let id = ComponentId::new(index as u32);
            store_slot(
                &mut self.stores,
                &self.registry,
                self.config.component_capacity,
                id,
            );
        }
    }

    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Entities
    // ---------------------------------------------------------------------

    /// Create an empty entity.
    pub fn create(&mut self) -> EntityId {
        self.entities.insert(EntityRecord::default())
    }

    /// Create an empty entity registered under `name` (empty for none).
    pub fn create_named(&mut self, name: &str) -> EntityId {
        let id = self.create();
        self.set_name(id, name);
        id
    }

    /// Create an entity and return a proxy to it.
    pub fn spawn(&mut self) -> EntityMut<'_> {
        let id = self.create();
        EntityMut::new(self, id)
    }

    pub fn spawn_named(&mut self, name: &str) -> EntityMut<'_> {
        let id = self.create_named(name);
        EntityMut::new(self, id)
    }

    /// Proxy for `id`. The proxy exists even when `id` is stale; check
    /// [`EntityRef::is_valid`].
    pub fn entity(&self, id: EntityId) -> EntityRef<'_> {
        EntityRef::new(self, id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> EntityMut<'_> {
        EntityMut::new(self, id)
    }

    /// Returns true if `id` names a live entity.
    #[inline]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Snapshot of all live entity ids.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.keys()
    }

    pub fn record(&self, id: EntityId) -> Option<&EntityRecord> {
        self.entities.get(id)
    }

    pub fn entity_id_by_name(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    /// Entity registered under `name`, created if there is none.
    pub fn entity_by_name_or_create(&mut self, name: &str) -> EntityId {
        match self.entity_id_by_name(name) {
            Some(id) => id,
            None => self.create_named(name),
        }
    }

    pub fn name(&self, id: EntityId) -> Option<&str> {
        self.entities.get(id)?.name()
    }

    /// Register `name` for `id`, releasing its previous name. An empty name
    /// only releases. A name already held by another entity moves to `id`.
    pub fn set_name(&mut self, id: EntityId, name: &str) -> bool {
        let Some(record) = self.entities.get_mut(id) else {
            return false;
        };
        if let Some(old) = record.name.take() {
            self.names.remove(&old);
        }
        if name.is_empty() {
            return true;
        }

        record.name = Some(name.to_owned());
        if let Some(previous) = self.names.insert(name.to_owned(), id) {
            if let Some(previous) = self.entities.get_mut(previous) {
                previous.name = None;
            }
        }
        true
    }

    /// Remove every component of `id`; the entity stays alive.
    pub fn clear_components(&mut self, id: EntityId) {
        let Some(record) = self.entities.get_mut(id) else {
            return;
        };
        for (component, key) in record.components.drain() {
            if let Some(Some(store)) = self.stores.get_mut(component.index()) {
                store.remove(key, StoreToken::new());
            }
        }
    }

    /// Remove every component of `id` and free its directory slot. The id
    /// (and any copy of it) is invalid afterwards.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.clear_components(id);
        if let Some(record) = self.entities.remove(id) {
            if let Some(name) = record.name {
                self.names.remove(&name);
            }
        }
        true
    }

    /// Drop every entity and component. Stores are kept, emptied.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.names.clear();
        for store in self.stores.iter_mut().flatten() {
            store.clear(StoreToken::new());
        }
    }

    // ---------------------------------------------------------------------
    // Stores
    // ---------------------------------------------------------------------

    fn expect_component_id<T: Component>(&self) -> ComponentId {
        match self.registry.id_of::<T>() {
            Some(id) => id,
            None => panic!("component type `{}` is not registered", type_name::<T>()),
        }
    }

    fn checked_component_id<T: Component>(&self) -> Result<ComponentId> {
        self.registry
            .id_of::<T>()
            .ok_or(EcsError::UnregisteredComponent(type_name::<T>()))
    }

    /// Store for `id`. A registered type this world has not touched yet
    /// reads as an empty store; only unregistered ids are absent.
    pub fn erased_store(&self, id: ComponentId) -> Option<&dyn ErasedStore> {
        match self.stores.get(id.index()) {
            Some(Some(store)) => Some(&**store),
            _ => self.registry.empty_store(id),
        }
    }

    pub fn erased_store_mut(&mut self, id: ComponentId) -> Option<&mut (dyn ErasedStore + 'static)> {
        store_slot(
            &mut self.stores,
            &self.registry,
            self.config.component_capacity,
            id,
        )
    }

    pub fn store_by_name(&self, name: &str) -> Option<&dyn ErasedStore> {
        self.erased_store(self.registry.id_by_name(name)?)
    }

    pub fn store_by_name_mut(&mut self, name: &str) -> Option<&mut (dyn ErasedStore + 'static)> {
        let id = self.registry.id_by_name(name)?;
        self.erased_store_mut(id)
    }

    /// Typed store, if `T` is registered and the store has been created.
    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        let id = self.registry.id_of::<T>()?;
        self.erased_store(id)?.downcast_ref::<T>()
    }

    /// Typed store, created on first touch.
    ///
    /// # Panics
    /// Panics if `T` was never registered.
    pub fn store_mut<T: Component>(&mut self) -> &mut ComponentStore<T> {
        match self.try_store::<T>() {
            Ok(store) => store,
            Err(err) => panic!("{err}"),
        }
    }

    /// [`store_mut`](Self::store_mut) with an error instead of a panic.
    pub fn try_store<T: Component>(&mut self) -> Result<&mut ComponentStore<T>> {
        let id = self.checked_component_id::<T>()?;
        self.erased_store_mut(id)
            .and_then(|store| store.downcast_mut::<T>())
            .ok_or(EcsError::UnregisteredComponent(type_name::<T>()))
    }

    /// Number of elements in the store for `id`; zero if it does not exist.
    pub fn store_len(&self, id: ComponentId) -> usize {
        self.erased_store(id).map_or(0, |store| store.len())
    }

    /// Dense `(owner, value)` pairs of every `T` in this world.
    pub fn components<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.store::<T>().into_iter().flat_map(|store| store.iter())
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    /// Key of `entity`'s component of type `id`.
    pub fn component_key(&self, entity: EntityId, id: ComponentId) -> Option<ComponentKey> {
        self.entities.get(entity)?.component_key(id)
    }

    /// Typed slot for `entity`: overwrite with `value` if given, otherwise
    /// keep the existing component. Missing components are created from
    /// `value` or `T::default()`.
    fn typed_entry<T: Component>(
        &mut self,
        entity: EntityId,
        id: ComponentId,
        value: Option<T>,
    ) -> Option<&mut T> {
        let World {
            entities,
            stores,
            registry,
            config,
            ..
        } = self;
        let record = entities.get_mut(entity)?;
        let store = store_slot(stores, registry, config.component_capacity, id)?.downcast_mut::<T>()?;

        match record.component_key(id).filter(|&key| store.contains(key)) {
            Some(key) => {
                let slot = store.get_mut(key)?;
                if let Some(value) = value {
                    *slot = value;
                }
                Some(slot)
            }
            None => {
                let key = store.insert(entity, value.unwrap_or_default());
                record.components.insert(id, key);
                store.get_mut(key)
            }
        }
    }

    /// Set `entity`'s component `T`. A new component records `entity` as its
    /// owner; an existing one is overwritten in place. Returns `None` if the
    /// entity is not alive.
    ///
    /// # Panics
    /// Panics if `T` was never registered.
    pub fn assign<T: Component>(&mut self, entity: EntityId, value: T) -> Option<&mut T> {
        let id = self.expect_component_id::<T>();
        self.typed_entry(entity, id, Some(value))
    }

    /// [`assign`](Self::assign) with errors instead of panics.
    pub fn try_assign<T: Component>(&mut self, entity: EntityId, value: T) -> Result<&mut T> {
        let id = self.checked_component_id::<T>()?;
        self.typed_entry(entity, id, Some(value))
            .ok_or(EcsError::InvalidEntity)
    }

    /// Component `T` of `entity`, default-constructed first if missing.
    ///
    /// # Panics
    /// Panics if `T` was never registered.
    pub fn at<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        let id = self.expect_component_id::<T>();
        self.typed_entry(entity, id, None)
    }

    /// Named component of `entity`, default-constructed first if missing.
    /// `None` for dead entities and unknown names.
    pub fn access(&mut self, entity: EntityId, name: &str) -> Option<&mut dyn ComponentData> {
        let id = self.registry.id_by_name(name)?;
        self.access_by_id(entity, id)
    }

    pub fn access_by_id(&mut self, entity: EntityId, id: ComponentId) -> Option<&mut dyn ComponentData> {
        let World {
            entities,
            stores,
            registry,
            config,
            ..
        } = self;
        let record = entities.get_mut(entity)?;
        let store = store_slot(stores, registry, config.component_capacity, id)?;

        let key = match record.component_key(id).filter(|&key| store.contains(key)) {
            Some(key) => key,
            None => {
                let key = store.insert_default(entity, StoreToken::new());
                record.components.insert(id, key);
                key
            }
        };
        store.get_mut(key)
    }

    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        let id = self.registry.id_of::<T>()?;
        let key = self.component_key(entity, id)?;
        self.erased_store(id)?.downcast_ref::<T>()?.get(key)
    }

    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        let id = self.registry.id_of::<T>()?;
        let key = self.component_key(entity, id)?;
        self.stores
            .get_mut(id.index())?
            .as_deref_mut()?
            .downcast_mut::<T>()?
            .get_mut(key)
    }

    pub fn get_by_id(&self, entity: EntityId, id: ComponentId) -> Option<&dyn ComponentData> {
        let key = self.component_key(entity, id)?;
        self.erased_store(id)?.get(key)
    }

    pub fn get_by_name(&self, entity: EntityId, name: &str) -> Option<&dyn ComponentData> {
        self.get_by_id(entity, self.registry.id_by_name(name)?)
    }

    pub fn get_by_name_mut(&mut self, entity: EntityId, name: &str) -> Option<&mut dyn ComponentData> {
        let id = self.registry.id_by_name(name)?;
        let key = self.component_key(entity, id)?;
        self.stores.get_mut(id.index())?.as_deref_mut()?.get_mut(key)
    }

    /// Handle to `entity`'s component `T`, re-resolved on every access.
    pub fn component_handle<T: Component>(
        &self,
        entity: EntityId,
    ) -> Option<Handle<'_, ComponentKey, Stored<T>>> {
        let id = self.registry.id_of::<T>()?;
        let key = self.component_key(entity, id)?;
        Some(self.store::<T>()?.handle(key))
    }

    pub fn has<T: Component>(&self, entity: EntityId) -> bool {
        self.registry
            .id_of::<T>()
            .is_some_and(|id| self.has_id(entity, id))
    }

    pub fn has_id(&self, entity: EntityId, id: ComponentId) -> bool {
        self.entities
            .get(entity)
            .is_some_and(|record| record.contains(id))
    }

    /// True if `entity` has every type in `S`. The empty set is satisfied
    /// by any live entity.
    pub fn has_all<S: ComponentSet>(&self, entity: EntityId) -> bool {
        self.contains(entity)
            && S::type_ids().iter().all(|&type_id| {
                self.registry
                    .id_of_type(type_id)
                    .is_some_and(|id| self.has_id(entity, id))
            })
    }

    pub fn has_name(&self, entity: EntityId, name: &str) -> bool {
        self.registry
            .id_by_name(name)
            .is_some_and(|id| self.has_id(entity, id))
    }

    pub fn has_names(&self, entity: EntityId, names: &[&str]) -> bool {
        self.contains(entity) && names.iter().all(|name| self.has_name(entity, name))
    }

    pub fn component_count(&self, entity: EntityId) -> usize {
        self.entities.get(entity).map_or(0, EntityRecord::len)
    }

    /// Registered names of `entity`'s components, sorted.
    pub fn component_names(&self, entity: EntityId) -> Vec<&'static str> {
        let Some(record) = self.entities.get(entity) else {
            return Vec::new();
        };
        let mut names: Vec<_> = record
            .components()
            .filter_map(|(id, _)| self.registry.name_of(id))
            .collect();
        names.sort_unstable();
        names
    }

    /// Remove `entity`'s component `T` and return it.
    pub fn remove<T: Component>(&mut self, entity: EntityId) -> Option<T> {
        let id = self.registry.id_of::<T>()?;
        let key = self.entities.get_mut(entity)?.components.remove(&id)?;
        self.stores
            .get_mut(id.index())?
            .as_deref_mut()?
            .downcast_mut::<T>()?
            .remove(key)
    }

    pub fn remove_by_id(&mut self, entity: EntityId, id: ComponentId) -> bool {
        let Some(key) = self
            .entities
            .get_mut(entity)
            .and_then(|record| record.components.remove(&id))
        else {
            return false;
        };
        match self.stores.get_mut(id.index()) {
            Some(Some(store)) => store.remove(key, StoreToken::new()),
            _ => false,
        }
    }

    pub fn remove_by_name(&mut self, entity: EntityId, name: &str) -> bool {
        match self.registry.id_by_name(name) {
            Some(id) => self.remove_by_id(entity, id),
            None => false,
        }
    }

    /// Remove every type in `S`; returns how many were present.
    pub fn remove_all<S: ComponentSet>(&mut self, entity: EntityId) -> usize {
        let ids: SmallVec<[ComponentId; 8]> = S::type_ids()
            .iter()
            .filter_map(|&type_id| self.registry.id_of_type(type_id))
            .collect();
        ids.into_iter()
            .filter(|&id| self.remove_by_id(entity, id))
            .count()
    }

    // ---------------------------------------------------------------------
    // Cloning
    // ---------------------------------------------------------------------

    /// Copy `source` into a brand-new entity of this world named `name`.
    ///
    /// A stale `source` still yields a new, empty entity.
    pub fn clone_entity(&mut self, source: EntityId, name: &str) -> EntityId {
        let target = self.create_named(name);
        let components: SmallVec<[(ComponentId, ComponentKey); 8]> = match self.entities.get(source) {
            Some(record) => record.components().collect(),
            None => return target,
        };

        #[cfg(feature = "profiling")]
        let span = info_span!("world.clone_entity", components = components.len());
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        for (id, key) in components {
            let Some(store) = self.erased_store_mut(id) else {
                continue;
            };
            if let Some(copy) = store.duplicate(key, target, StoreToken::new()) {
                self.entities[target].components.insert(id, copy);
            }
        }
        target
    }

    /// Copy `source` into a brand-new entity of `target` named `name`.
    ///
    /// Component types are matched by Rust type, so `target` may use a
    /// different registry; types it does not know are skipped. A stale
    /// `source` still yields a new, empty entity.
    pub fn clone_into(&self, source: EntityId, target: &mut World, name: &str) -> EntityId {
        let new_id = target.create_named(name);
        let Some(record) = self.entities.get(source) else {
            return new_id;
        };

        #[cfg(feature = "profiling")]
        let span = info_span!("world.clone_into", components = record.len());
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        let shared_registry = Arc::ptr_eq(&self.registry, &target.registry);
        for (id, key) in record.components() {
            let Some(source_store) = self.erased_store(id) else {
                continue;
            };
            let target_component = if shared_registry {
                Some(id)
            } else {
                target.registry.id_of_type(source_store.component_type_id())
            };
            let Some(target_component) = target_component else {
                tracing::debug!(
                    component = source_store.component_type_name(),
                    "skipping component unknown to target registry"
                );
                continue;
            };
            let Some(dest) = target.erased_store_mut(target_component) else {
                continue;
            };
            if let Some(copy) = dest.copy_from(source_store, key, new_id, StoreToken::new()) {
                target.entities[new_id]
                    .components
                    .insert(target_component, copy);
            }
        }
        new_id
    }

    /// Clone the entity named `prototype` from `prototypes` into this world.
    /// An unknown prototype name yields a new, empty entity.
    pub fn instantiate(&mut self, prototypes: &World, prototype: &str, name: &str) -> EntityId {
        let source = prototypes
            .entity_id_by_name(prototype)
            .unwrap_or(EntityId::INVALID);
        prototypes.clone_into(source, self, name)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stores: Vec<_> = self
            .stores
            .iter()
            .flatten()
            .map(|store| (store.component_type_name(), store.len()))
            .collect();
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("named", &self.names.len())
            .field("stores", &stores)
            .finish()
    }
}
