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

//! Packed ECS - entity component storage over generational slot maps
//!
//! Every component type lives in its own densely packed store. Entities are
//! records in a slot map that point at their components; queries pivot on
//! the smallest requested store. Ids are generational, so a stale id never
//! aliases a newer entity or component.
//!
//! ```
//! use packed_ecs::prelude::*;
//! use std::sync::Arc;
//!
//! #[derive(Clone, Default)]
//! struct Health(u32);
//!
//! impl Component for Health {
//!     fn save(&self) -> String {
//!         self.0.to_string()
//!     }
//!
//!     fn load(&mut self, data: &str) {
//!         self.0 = data.parse().unwrap_or_default();
//!     }
//! }
//!
//! let registry = Arc::new(ComponentRegistry::new());
//! registry.register::<Health>("Health");
//!
//! let mut world = World::with_registry(registry);
//! let hero = world.spawn_named("hero").assign(Health(10)).id();
//!
//! assert_eq!(world.query::<(Health,)>(), vec![hero]);
//! assert_eq!(world.entity(hero).serialize(), vec!["Health 10".to_string()]);
//! ```

pub mod component;
pub mod config;
pub mod entity;
pub mod error;
pub mod id;
pub mod prelude;
pub mod query;
pub mod registry;
pub mod serialization;
pub mod slot_map;
pub mod storage;
pub mod world;

#[cfg(test)]
mod testing;

pub use component::*;
pub use config::*;
pub use entity::*;
pub use error::*;
pub use id::*;
pub use registry::*;
pub use serialization::*;
pub use slot_map::*;
pub use storage::*;
pub use world::*;
