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

//! Pivot queries
//!
//! A query returns every live entity that owns all requested component
//! types. The store with the fewest elements is the pivot: its owners are
//! the only candidates, and each candidate is checked against the other
//! requested types through its entity record. Cost is proportional to the
//! smallest store, not to the number of entities.

use smallvec::SmallVec;

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::component::{ComponentId, ComponentSet, MAX_SET_COMPONENTS};
use crate::id::EntityId;
use crate::world::World;

type IdList = SmallVec<[ComponentId; MAX_SET_COMPONENTS]>;

impl World {
    /// Entities that own every type in `S`.
    ///
    /// The empty set matches every live entity. A type that was never
    /// registered matches nothing.
    pub fn query<S: ComponentSet>(&self) -> Vec<EntityId> {
        let ids: Option<IdList> = S::type_ids()
            .iter()
            .map(|&type_id| self.registry().id_of_type(type_id))
            .collect();
        match ids {
            Some(ids) => self.query_ids(&ids),
            None => Vec::new(),
        }
    }

    /// Entities that own every named component type. Unknown names match
    /// nothing.
    pub fn query_names(&self, names: &[&str]) -> Vec<EntityId> {
        let ids: Option<IdList> = names
            .iter()
            .map(|name| self.registry().id_by_name(name))
            .collect();
        match ids {
            Some(ids) => self.query_ids(&ids),
            None => Vec::new(),
        }
    }

    /// Entities that own every component type in `ids`.
    pub fn query_ids(&self, ids: &[ComponentId]) -> Vec<EntityId> {
        let Some(pivot) = ids.iter().copied().min_by_key(|&id| self.store_len(id)) else {
            return self.entity_ids();
        };
        let Some(store) = self.erased_store(pivot) else {
            return Vec::new();
        };

        #[cfg(feature = "profiling")]
        let span = info_span!("world.query", components = ids.len(), pivot_len = store.len());
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        (0..store.len())
            .filter_map(|position| Some((store.key_at(position)?, store.owner_at(position)?)))
            .filter(|&(key, owner)| {
                self.record(owner).is_some_and(|record| {
                    record.component_key(pivot) == Some(key)
                        && ids.iter().all(|&id| record.contains(id))
                })
            })
            .map(|(_, owner)| owner)
            .collect()
    }

    /// Number of entities [`query`](Self::query) would return.
    pub fn count<S: ComponentSet>(&self) -> usize {
        self.query::<S>().len()
    }
}
