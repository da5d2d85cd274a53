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

//! Component traits
//!
//! Components are plain data records stored in per-type slot maps. Each
//! type carries its own text encoding so it can be serialized by name
//! without the storage layer knowing the concrete type.

use std::any::{Any, TypeId};
use std::fmt;

use smallvec::{smallvec, SmallVec};

/// Maximum number of component types in a [`ComponentSet`].
pub const MAX_SET_COMPONENTS: usize = 8;

/// Data that can be attached to entities.
///
/// `save` and `load` use a space-delimited field encoding by convention.
/// `load` must never fail: fields that do not parse keep their default.
pub trait Component: Clone + Default + Send + Sync + 'static {
    /// Encode this component as text. Components with no encoding return
    /// an empty string.
    fn save(&self) -> String {
        String::new()
    }

    /// Overwrite this component from `data`.
    fn load(&mut self, _data: &str) {}
}

/// Implement [`Component`] with an empty text encoding.
#[macro_export]
macro_rules! impl_component {
    ($($t:ty),+ $(,)?) => {
        $(impl $crate::component::Component for $t {})+
    };
}

/// Scalars encode through `Display` / `FromStr`; unparsable text loads the
/// default.
macro_rules! impl_scalar_component {
    ($($t:ty),+ $(,)?) => {
        $(
            impl Component for $t {
                fn save(&self) -> String {
                    self.to_string()
                }

                fn load(&mut self, data: &str) {
                    *self = data.trim().parse().unwrap_or_default();
                }
            }
        )+
    };
}

impl_scalar_component!(bool, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

impl Component for String {
    fn save(&self) -> String {
        self.clone()
    }

    fn load(&mut self, data: &str) {
        data.clone_into(self);
    }
}

/// Object-safe view of a component, used by name-based access.
pub trait ComponentData: Any + Send + Sync {
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Same as [`Component::save`].
    fn encode(&self) -> String;

    /// Same as [`Component::load`].
    fn decode(&mut self, data: &str);

    fn clone_boxed(&self) -> Box<dyn ComponentData>;
}

impl<T: Component> ComponentData for T {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn encode(&self) -> String {
        Component::save(self)
    }

    fn decode(&mut self, data: &str) {
        Component::load(self, data)
    }

    fn clone_boxed(&self) -> Box<dyn ComponentData> {
        Box::new(self.clone())
    }
}

impl dyn ComponentData {
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl fmt::Debug for dyn ComponentData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentData")
            .field("type", &self.type_name())
            .field("encoded", &self.encode())
            .finish()
    }
}

/// Runtime token for a registered component type.
///
/// Assigned densely by the registry at registration time, so it doubles as
/// an index into per-world store tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u32);

impl ComponentId {
    pub(crate) const fn new(index: u32) -> Self {
        ComponentId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A set of component types, used for `has_all`, `remove_all` and queries.
///
/// Implemented for tuples of up to [`MAX_SET_COMPONENTS`] components and for
/// `()`, the empty set.
pub trait ComponentSet: 'static {
    /// Type IDs of all components in the set
    fn type_ids() -> SmallVec<[TypeId; MAX_SET_COMPONENTS]>;

    /// Type names, for diagnostics
    fn type_names() -> SmallVec<[&'static str; MAX_SET_COMPONENTS]>;
}

impl ComponentSet for () {
    fn type_ids() -> SmallVec<[TypeId; MAX_SET_COMPONENTS]> {
        SmallVec::new()
    }

    fn type_names() -> SmallVec<[&'static str; MAX_SET_COMPONENTS]> {
        SmallVec::new()
    }
}

// DO NOT implement ComponentSet for T: Component
// This conflicts with tuple implementations
macro_rules! impl_component_set {
    ($($T:ident),*) => {
        impl<$($T: Component),*> ComponentSet for ($($T,)*) {
            fn type_ids() -> SmallVec<[TypeId; MAX_SET_COMPONENTS]> {
                smallvec![$(TypeId::of::<$T>()),*]
            }

            fn type_names() -> SmallVec<[&'static str; MAX_SET_COMPONENTS]> {
                smallvec![$(std::any::type_name::<$T>()),*]
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default, Debug, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    impl Component for Position {
        fn save(&self) -> String {
            format!("{} {}", self.x, self.y)
        }

        fn load(&mut self, data: &str) {
            let mut fields = data.split_whitespace();
            self.x = fields.next().and_then(|f| f.parse().ok()).unwrap_or_default();
            self.y = fields.next().and_then(|f| f.parse().ok()).unwrap_or_default();
        }
    }

    #[derive(Clone, Default)]
    struct Marker;
    impl_component!(Marker);

    #[test]
    fn test_single_component_set() {
        let type_ids = <(Position,)>::type_ids();
        assert_eq!(type_ids.len(), 1);
        assert_eq!(type_ids[0], TypeId::of::<Position>());
    }

    #[test]
    fn test_multiple_component_set() {
        let type_ids = <(Position, Marker, u32)>::type_ids();
        assert_eq!(type_ids.len(), 3);
        assert!(<()>::type_ids().is_empty());
    }

    #[test]
    fn test_erased_encode_decode() {
        let mut boxed: Box<dyn ComponentData> = Box::new(Position { x: 3.0, y: 4.0 });
        assert_eq!(boxed.encode(), "3 4");

        boxed.decode("7 oops");
        let pos = boxed.downcast_ref::<Position>().unwrap();
        assert_eq!(*pos, Position { x: 7.0, y: 0.0 });
        assert!(boxed.is::<Position>());
        assert!(boxed.downcast_ref::<Marker>().is_none());
    }

    #[test]
    fn test_builtin_scalars_round_trip() {
        let mut count: Box<dyn ComponentData> = Box::new(42u32);
        assert_eq!(count.encode(), "42");
        count.decode("7");
        assert_eq!(count.downcast_ref::<u32>(), Some(&7));
        count.decode("not a number");
        assert_eq!(count.downcast_ref::<u32>(), Some(&0));

        let mut flag = false;
        Component::load(&mut flag, "true");
        assert!(flag);
        assert_eq!(Component::save(&-1.5f64), "-1.5");
    }

    #[test]
    fn test_string_keeps_spaces() {
        let mut text = String::new();
        Component::load(&mut text, "two words");
        assert_eq!(Component::save(&text), "two words");
    }

    #[test]
    fn test_default_encoding_is_empty() {
        assert_eq!(Marker.encode(), "");
        let copy = Marker.clone_boxed();
        assert!(copy.is::<Marker>());
    }
}
