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

//! Generational identifiers.
//!
//! Every element stored in a [`SlotMap`](crate::slot_map::SlotMap) is named by
//! a 64-bit value: the high 32 bits hold the slot's generation, the low 32
//! bits hold the slot index. Generation zero never occurs on a live slot, so
//! any identifier with generation zero is invalid.

use std::fmt;
use std::hash::Hash;

/// Packed generation + slot index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct RawId(u64);

impl RawId {
    /// The canonical invalid identifier (generation 0).
    pub const INVALID: RawId = RawId(0);

    pub const fn new(generation: u32, index: u32) -> Self {
        RawId(((generation as u64) << 32) | index as u64)
    }

    pub const fn from_bits(bits: u64) -> Self {
        RawId(bits)
    }

    pub const fn to_bits(self) -> u64 {
        self.0
    }

    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// True when the generation is zero. Says nothing about whether a
    /// non-null id is still live in any particular map.
    pub const fn is_null(self) -> bool {
        self.generation() == 0
    }
}

impl fmt::Debug for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Next generation after `generation`, skipping zero on wraparound.
#[inline]
pub(crate) fn next_generation(generation: u32) -> u32 {
    match generation.wrapping_add(1) {
        0 => 1,
        next => next,
    }
}

/// Typed identifier usable as a slot map key.
pub trait Key: Copy + Eq + Hash + fmt::Debug + From<RawId> + 'static {
    fn raw(self) -> RawId;

    fn null() -> Self {
        RawId::INVALID.into()
    }

    fn is_null(self) -> bool {
        self.raw().is_null()
    }
}

impl Key for RawId {
    fn raw(self) -> RawId {
        self
    }
}

/// Declares newtype keys wrapping [`RawId`].
///
/// ```
/// packed_ecs::new_key_type! {
///     /// Key for projectile records.
///     pub struct ProjectileKey;
/// }
/// ```
#[macro_export]
macro_rules! new_key_type {
    ( $( $(#[$outer:meta])* $vis:vis struct $name:ident; )* ) => {
        $(
            $(#[$outer])*
            #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
            #[repr(transparent)]
            $vis struct $name($crate::id::RawId);

            impl $name {
                /// Key that never resolves in any map.
                pub const INVALID: $name = $name($crate::id::RawId::INVALID);

                pub const fn from_bits(bits: u64) -> Self {
                    $name($crate::id::RawId::from_bits(bits))
                }

                pub const fn to_bits(self) -> u64 {
                    self.0.to_bits()
                }

                pub const fn generation(self) -> u32 {
                    self.0.generation()
                }

                pub const fn index(self) -> u32 {
                    self.0.index()
                }
            }

            impl ::std::convert::From<$crate::id::RawId> for $name {
                fn from(raw: $crate::id::RawId) -> Self {
                    $name(raw)
                }
            }

            impl $crate::id::Key for $name {
                fn raw(self) -> $crate::id::RawId {
                    self.0
                }
            }

            impl ::std::fmt::Debug for $name {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    write!(f, "{}({:?})", stringify!($name), self.0)
                }
            }
        )*
    };
}

new_key_type! {
    /// Identifier of an entity record in a world's entity directory.
    pub struct EntityId;

    /// Identifier of one component instance inside its typed store.
    pub struct ComponentKey;
}
