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

//! Component type registry
//!
//! Maps each component type to a dense [`ComponentId`], an optional
//! serialization name, and a prototype store that worlds clone to get
//! their own empty store of that type. Registration is expected to happen
//! during startup; after that the registry is effectively read-only.

use std::any::TypeId;
use std::sync::{Arc, OnceLock};

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::component::{Component, ComponentId};
use crate::storage::{ComponentStore, ErasedStore};

struct Registration {
    type_id: TypeId,
    type_name: &'static str,
    /// Name used when serializing; the first non-empty name registered.
    name: Option<&'static str>,
    /// Empty store of this type. Lives as long as the process so that worlds
    /// can lend it out for types they have not touched yet.
    prototype: &'static dyn ErasedStore,
}

#[derive(Default)]
struct RegistryTables {
    entries: Vec<Registration>,
    by_type: AHashMap<TypeId, ComponentId>,
    by_name: AHashMap<&'static str, ComponentId>,
}

impl RegistryTables {
    fn bind_name(&mut self, name: &'static str, id: ComponentId) {
        if let Some(previous) = self.by_name.insert(name, id) {
            if previous == id {
                return;
            }
            tracing::warn!(
                component_name = name,
                from = self.entries[previous.index()].type_name,
                to = self.entries[id.index()].type_name,
                "component name rebound to a different type"
            );
            let displaced = &mut self.entries[previous.index()];
            if displaced.name == Some(name) {
                displaced.name = None;
            }
        }

        let entry = &mut self.entries[id.index()];
        if entry.name.is_none() {
            entry.name = Some(name);
        }
    }
}

/// Table of registered component types.
///
/// [`ComponentRegistry::global`] is the process-wide instance used by
/// [`World::new`](crate::world::World::new). Independent registries can be
/// created with [`ComponentRegistry::new`] and injected into worlds.
#[derive(Default)]
pub struct ComponentRegistry {
    tables: RwLock<RegistryTables>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry.
    pub fn global() -> Arc<ComponentRegistry> {
        static GLOBAL: OnceLock<Arc<ComponentRegistry>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(ComponentRegistry::new()))
            .clone()
    }

    /// Register `T`, optionally under `name` (empty for none).
    ///
    /// Registering a type again keeps its id and prototype; a new non-empty
    /// name becomes an additional lookup alias.
    ///
    /// # Panics
    /// Panics if `name` contains whitespace, since names are the first field
    /// of serialized component lines.
    pub fn register<T: Component>(&self, name: &'static str) -> ComponentId {
        assert!(
            !name.contains(char::is_whitespace),
            "component name {name:?} must not contain whitespace"
        );

        let mut tables = self.tables.write();
        let type_id = TypeId::of::<T>();
        let id = match tables.by_type.get(&type_id) {
            Some(&id) => id,
            None => {
                let id = ComponentId::new(tables.entries.len() as u32);
                let type_name = std::any::type_name::<T>();
                tables.entries.push(Registration {
                    type_id,
                    type_name,
                    name: None,
                    prototype: Box::leak(Box::new(ComponentStore::<T>::new(id))),
                });
                tables.by_type.insert(type_id, id);
                tracing::debug!(component = type_name, id = id.index(), "registered component");
                id
            }
        };

        if !name.is_empty() {
            tables.bind_name(name, id);
        }
        id
    }

    /// Register `T` without a name. Such components are skipped by
    /// serialization.
    pub fn register_unnamed<T: Component>(&self) -> ComponentId {
        self.register::<T>("")
    }

    pub fn id_of<T: Component>(&self) -> Option<ComponentId> {
        self.id_of_type(TypeId::of::<T>())
    }

    pub fn id_of_type(&self, type_id: TypeId) -> Option<ComponentId> {
        self.tables.read().by_type.get(&type_id).copied()
    }

    /// Look up a component by its registered name or alias.
    pub fn id_by_name(&self, name: &str) -> Option<ComponentId> {
        self.tables.read().by_name.get(name).copied()
    }

    pub fn contains<T: Component>(&self) -> bool {
        self.id_of::<T>().is_some()
    }

    /// Serialization name of `id`.
    pub fn name_of(&self, id: ComponentId) -> Option<&'static str> {
        self.tables.read().entries.get(id.index())?.name
    }

    pub fn type_name_of(&self, id: ComponentId) -> Option<&'static str> {
        self.tables
            .read()
            .entries
            .get(id.index())
            .map(|entry| entry.type_name)
    }

    pub fn type_id_of(&self, id: ComponentId) -> Option<TypeId> {
        self.tables
            .read()
            .entries
            .get(id.index())
            .map(|entry| entry.type_id)
    }

    /// Every registered name and alias.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.tables.read().by_name.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tables.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shared empty store for `id`, for read paths of worlds that have not
    /// created their own store yet.
    pub(crate) fn empty_store(&self, id: ComponentId) -> Option<&'static dyn ErasedStore> {
        self.tables
            .read()
            .entries
            .get(id.index())
            .map(|entry| entry.prototype)
    }

    /// Fresh empty store for `id`.
    pub(crate) fn instantiate(&self, id: ComponentId) -> Option<Box<dyn ErasedStore>> {
        self.tables
            .read()
            .entries
            .get(id.index())
            .map(|entry| entry.prototype.clone_empty())
    }
}
