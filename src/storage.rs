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

//! Per-type component stores
//!
//! [`ComponentStore<T>`] is a slot map of `T` where every element also
//! records the entity that owns it. [`ErasedStore`] is the object-safe
//! surface used by the registry and by worlds, so heterogeneous stores can
//! sit side by side in one table.

use std::any::{Any, TypeId};

use crate::component::{Component, ComponentData, ComponentId};
use crate::id::{ComponentKey, EntityId};
use crate::slot_map::{Handle, SlotMap};

/// Permission to add or remove store elements.
///
/// Only this crate can create one, so elements and their owner
/// back-references are only ever written by the entity layer, which keeps
/// entity records in step.
#[derive(Clone, Copy, Debug)]
pub struct StoreToken(());

impl StoreToken {
    pub(crate) const fn new() -> Self {
        Self(())
    }
}

/// A component value plus its owner back-reference.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stored<T> {
    owner: EntityId,
    value: T,
}

impl<T> Stored<T> {
    /// Owning entity. [`EntityId::INVALID`] until the entity layer assigns it.
    #[inline]
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    #[inline]
    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

/// Slot map of one component type.
#[derive(Clone)]
pub struct ComponentStore<T: Component> {
    id: ComponentId,
    slots: SlotMap<ComponentKey, Stored<T>>,
}

impl<T: Component> ComponentStore<T> {
    pub fn new(id: ComponentId) -> Self {
        Self {
            id,
            slots: SlotMap::new(),
        }
    }

    pub fn with_capacity(id: ComponentId, capacity: usize) -> Self {
        Self {
            id,
            slots: SlotMap::with_capacity(capacity),
        }
    }

    pub fn component_id(&self) -> ComponentId {
        self.id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Store `value` owned by `owner`.
    pub(crate) fn insert(&mut self, owner: EntityId, value: T) -> ComponentKey {
        self.slots.insert(Stored { owner, value })
    }

    #[inline]
    pub fn contains(&self, key: ComponentKey) -> bool {
        self.slots.contains_key(key)
    }

    #[inline]
    pub fn get(&self, key: ComponentKey) -> Option<&T> {
        self.slots.get(key).map(Stored::value)
    }

    #[inline]
    pub fn get_mut(&mut self, key: ComponentKey) -> Option<&mut T> {
        self.slots.get_mut(key).map(Stored::value_mut)
    }

    pub fn owner(&self, key: ComponentKey) -> Option<EntityId> {
        self.slots.get(key).map(Stored::owner)
    }

    pub(crate) fn remove(&mut self, key: ComponentKey) -> Option<T> {
        self.slots.remove(key).map(|stored| stored.value)
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }

    /// Dense `(owner, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.slots.iter().map(|stored| (stored.owner, &stored.value))
    }

    /// Dense `(owner, value)` pairs, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .map(|stored| (stored.owner, &mut stored.value))
    }

    /// Raw dense storage.
    pub fn entries(&self) -> &[Stored<T>] {
        self.slots.values()
    }

    /// Snapshot of live component keys.
    pub fn keys(&self) -> Vec<ComponentKey> {
        self.slots.keys()
    }

    pub fn handle(&self, key: ComponentKey) -> Handle<'_, ComponentKey, Stored<T>> {
        self.slots.handle(key)
    }
}

/// Type-erased store interface, implemented once per component type.
///
/// Methods that add or remove elements take a [`StoreToken`].
pub trait ErasedStore: Any + Send + Sync {
    fn component_id(&self) -> ComponentId;

    /// `TypeId` of the component type (not of the store).
    fn component_type_id(&self) -> TypeId;

    fn component_type_name(&self) -> &'static str;

    /// A new, empty store of the same concrete type.
    fn clone_empty(&self) -> Box<dyn ErasedStore>;

    fn reserve(&mut self, additional: usize);

    /// Insert a default-constructed component.
    fn insert_default(&mut self, owner: EntityId, token: StoreToken) -> ComponentKey;

    /// Insert a copy of `value`. `None` if `value` is a different type.
    fn insert_copy(
        &mut self,
        owner: EntityId,
        value: &dyn ComponentData,
        token: StoreToken,
    ) -> Option<ComponentKey>;

    /// Copy element `key` of `source`, a store of the same concrete type,
    /// into this store under `owner`.
    fn copy_from(
        &mut self,
        source: &dyn ErasedStore,
        key: ComponentKey,
        owner: EntityId,
        token: StoreToken,
    ) -> Option<ComponentKey>;

    /// Copy element `key` of this store into a new element owned by `owner`.
    fn duplicate(&mut self, key: ComponentKey, owner: EntityId, token: StoreToken) -> Option<ComponentKey>;

    fn contains(&self, key: ComponentKey) -> bool;

    fn get(&self, key: ComponentKey) -> Option<&dyn ComponentData>;

    fn get_mut(&mut self, key: ComponentKey) -> Option<&mut dyn ComponentData>;

    fn owner(&self, key: ComponentKey) -> Option<EntityId>;

    /// Owner of the element at dense `position`.
    fn owner_at(&self, position: usize) -> Option<EntityId>;

    /// Key of the element at dense `position`.
    fn key_at(&self, position: usize) -> Option<ComponentKey>;

    /// Element at dense `position` together with its owner.
    fn get_at(&self, position: usize) -> Option<(EntityId, &dyn ComponentData)>;

    /// Remove `key`; returns whether anything was removed.
    fn remove(&mut self, key: ComponentKey, token: StoreToken) -> bool;

    fn clear(&mut self, token: StoreToken);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStore for ComponentStore<T> {
    fn component_id(&self) -> ComponentId {
        self.id
    }

    fn component_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn component_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn clone_empty(&self) -> Box<dyn ErasedStore> {
        Box::new(ComponentStore::<T>::new(self.id))
    }

    fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    fn insert_default(&mut self, owner: EntityId, _token: StoreToken) -> ComponentKey {
        self.insert(owner, T::default())
    }

    fn insert_copy(
        &mut self,
        owner: EntityId,
        value: &dyn ComponentData,
        _token: StoreToken,
    ) -> Option<ComponentKey> {
        let value = value.downcast_ref::<T>()?.clone();
        Some(self.insert(owner, value))
    }

    fn copy_from(
        &mut self,
        source: &dyn ErasedStore,
        key: ComponentKey,
        owner: EntityId,
        _token: StoreToken,
    ) -> Option<ComponentKey> {
        let source = source.as_any().downcast_ref::<ComponentStore<T>>();
        debug_assert!(
            source.is_some(),
            "copy_from between stores of different component types"
        );
        let value = source?.get(key)?.clone();
        Some(self.insert(owner, value))
    }

    fn duplicate(&mut self, key: ComponentKey, owner: EntityId, _token: StoreToken) -> Option<ComponentKey> {
        let value = self.get(key)?.clone();
        Some(self.insert(owner, value))
    }

    fn contains(&self, key: ComponentKey) -> bool {
        ComponentStore::contains(self, key)
    }

    fn get(&self, key: ComponentKey) -> Option<&dyn ComponentData> {
        ComponentStore::get(self, key).map(|value| value as &dyn ComponentData)
    }

    fn get_mut(&mut self, key: ComponentKey) -> Option<&mut dyn ComponentData> {
        ComponentStore::get_mut(self, key).map(|value| value as &mut dyn ComponentData)
    }

    fn owner(&self, key: ComponentKey) -> Option<EntityId> {
        ComponentStore::owner(self, key)
    }

    fn owner_at(&self, position: usize) -> Option<EntityId> {
        self.slots.values().get(position).map(Stored::owner)
    }

    fn key_at(&self, position: usize) -> Option<ComponentKey> {
        self.slots.key_at(position)
    }

    fn get_at(&self, position: usize) -> Option<(EntityId, &dyn ComponentData)> {
        self.slots
            .values()
            .get(position)
            .map(|stored| (stored.owner, &stored.value as &dyn ComponentData))
    }

    fn remove(&mut self, key: ComponentKey, _token: StoreToken) -> bool {
        ComponentStore::remove(self, key).is_some()
    }

    fn clear(&mut self, _token: StoreToken) {
        ComponentStore::clear(self)
    }

    fn len(&self) -> usize {
        ComponentStore::len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn ErasedStore {
    pub fn downcast_ref<T: Component>(&self) -> Option<&ComponentStore<T>> {
        self.as_any().downcast_ref::<ComponentStore<T>>()
    }

    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        self.as_any_mut().downcast_mut::<ComponentStore<T>>()
    }
}
