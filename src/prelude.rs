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

//! Common imports

pub use crate::component::{Component, ComponentData, ComponentId, ComponentSet};
pub use crate::config::WorldConfig;
pub use crate::entity::{EntityMut, EntityRef};
pub use crate::error::{EcsError, Result};
pub use crate::id::{ComponentKey, EntityId, Key};
pub use crate::impl_component;
pub use crate::registry::ComponentRegistry;
pub use crate::serialization::WorldSnapshot;
pub use crate::slot_map::{Handle, HandleMut, SlotMap};
pub use crate::storage::ComponentStore;
pub use crate::world::World;
