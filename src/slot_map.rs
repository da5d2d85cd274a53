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

//! Generational slot map with swap-remove packing
//!
//! Values live in one dense `Vec` so bulk iteration touches contiguous
//! memory. Keys go through a stable slot table that maps a key's index to
//! the value's current dense position; freed slots form an intrusive free
//! list threaded through the unused table entries. A parallel reverse
//! table maps each dense position back to its slot so that swap-removal
//! can patch the slot of the element it moved.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use crate::id::{next_generation, Key, RawId};

/// End marker for the free list.
const FREE_LIST_END: u32 = u32::MAX;

/// Panics if a map with `slot_count` slots cannot grow by one.
fn assert_slot_available(slot_count: usize) {
    assert!(
        slot_count < FREE_LIST_END as usize,
        "slot map capacity exhausted at {slot_count} slots"
    );
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    generation: u32,
    used: bool,
    /// Dense position when used, next free slot otherwise.
    link: u32,
}

/// Dense, generational storage.
///
/// - `insert`, `get`, `remove` are O(1).
/// - Keys stay valid until their own removal (or `clear`).
/// - Removal swaps the last value into the hole, so iteration order is
///   not insertion order.
pub struct SlotMap<K: Key, V> {
    slots: Vec<Slot>,
    free_head: u32,
    values: Vec<V>,
    reverse: Vec<u32>,
    _key: PhantomData<fn(K) -> K>,
}

impl<K: Key, V> SlotMap<K, V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty map with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: FREE_LIST_END,
            values: Vec::with_capacity(capacity),
            reverse: Vec::with_capacity(capacity),
            _key: PhantomData,
        }
    }

    /// Number of live values.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reserve room for `additional` more values.
    pub fn reserve(&mut self, additional: usize) {
        self.values.reserve(additional);
        self.reverse.reserve(additional);
        self.slots.reserve(additional);
    }

    /// Number of slots ever issued. Never shrinks.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Store `value` and return its key.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX - 1` slots would be needed.
    pub fn insert(&mut self, value: V) -> K {
        // Checked before touching any vector so a panic leaves the map intact
        if self.free_head == FREE_LIST_END {
            assert_slot_available(self.slots.len());
        }

        let position = self.values.len() as u32;
        self.values.push(value);

        let (index, generation) = if self.free_head == FREE_LIST_END {
            let index = self.slots.len();
            self.slots.push(Slot {
                generation: 1,
                used: true,
                link: position,
            });
            (index as u32, 1)
        } else {
            // Pop the free list; the slot's generation was bumped on removal
            let index = self.free_head;
            let slot = &mut self.slots[index as usize];
            self.free_head = slot.link;
            slot.used = true;
            slot.link = position;
            (index, slot.generation)
        };

        self.reverse.push(index);
        K::from(RawId::new(generation, index))
    }

    /// Returns true if `key` names a live value.
    #[inline]
    pub fn contains_key(&self, key: K) -> bool {
        self.slot_of(key).is_some()
    }

    #[inline]
    fn slot_of(&self, key: K) -> Option<&Slot> {
        let raw = key.raw();
        if raw.is_null() {
            return None;
        }
        self.slots
            .get(raw.index() as usize)
            .filter(|slot| slot.used && slot.generation == raw.generation())
    }

    /// Get the value for `key`, or `None` if the key is invalid or stale.
    #[inline]
    pub fn get(&self, key: K) -> Option<&V> {
        let position = self.slot_of(key)?.link as usize;
        self.values.get(position)
    }

    /// Mutable variant of [`get`](Self::get).
    #[inline]
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let position = self.slot_of(key)?.link as usize;
        self.values.get_mut(position)
    }

    /// Remove the value for `key`. Invalid and stale keys are ignored.
    pub fn remove(&mut self, key: K) -> Option<V> {
        self.slot_of(key)?;
        let index = key.raw().index();

        let slot = &mut self.slots[index as usize];
        let position = slot.link as usize;
        slot.generation = next_generation(slot.generation);
        slot.used = false;
        slot.link = self.free_head;
        self.free_head = index;

        let value = self.values.swap_remove(position);
        self.reverse.swap_remove(position);

        // Patch the slot of whatever was moved into the hole
        if position < self.reverse.len() {
            let moved = self.reverse[position] as usize;
            self.slots[moved].link = position as u32;
        }

        Some(value)
    }

    /// Drop every value. All previously issued keys become invalid; slots
    /// are kept (with bumped generations) and recycled by later inserts.
    pub fn clear(&mut self) {
        self.values.clear();
        self.reverse.clear();
        self.free_head = FREE_LIST_END;
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.used {
                slot.generation = next_generation(slot.generation);
                slot.used = false;
            }
            slot.link = self.free_head;
            self.free_head = index as u32;
        }
    }

    /// Key of the value at dense `position`.
    pub fn key_at(&self, position: usize) -> Option<K> {
        let index = *self.reverse.get(position)?;
        let generation = self.slots[index as usize].generation;
        Some(K::from(RawId::new(generation, index)))
    }

    /// Snapshot of every live key, in slot order.
    ///
    /// The returned vector is independent of the map, so callers may insert
    /// or remove while walking it.
    pub fn keys(&self) -> Vec<K> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.used)
            .map(|(index, slot)| K::from(RawId::new(slot.generation, index as u32)))
            .collect()
    }

    /// Dense values, in storage order.
    #[inline]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    #[inline]
    pub fn values_mut(&mut self) -> &mut [V] {
        &mut self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.values.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, V> {
        self.values.iter_mut()
    }

    /// Dense values paired with their keys.
    pub fn iter_keyed(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.reverse.iter().zip(self.values.iter()).map(|(&index, value)| {
            let generation = self.slots[index as usize].generation;
            (K::from(RawId::new(generation, index)), value)
        })
    }

    /// Borrowing handle that re-resolves `key` on every access.
    pub fn handle(&self, key: K) -> Handle<'_, K, V> {
        Handle { map: self, key }
    }

    /// Mutable counterpart of [`handle`](Self::handle).
    pub fn handle_mut(&mut self, key: K) -> HandleMut<'_, K, V> {
        HandleMut { map: self, key }
    }
}

impl<K: Key, V> Default for SlotMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V: Clone> Clone for SlotMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            free_head: self.free_head,
            values: self.values.clone(),
            reverse: self.reverse.clone(),
            _key: PhantomData,
        }
    }
}

impl<K: Key, V: fmt::Debug> fmt::Debug for SlotMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter_keyed()).finish()
    }
}

/// Unchecked lookup.
///
/// Only use with keys already known to be live. A stale key may resolve to
/// another value; an out-of-range key panics.
impl<K: Key, V> Index<K> for SlotMap<K, V> {
    type Output = V;

    fn index(&self, key: K) -> &V {
        debug_assert!(self.contains_key(key), "stale slot map key {key:?}");
        let position = self.slots[key.raw().index() as usize].link as usize;
        &self.values[position]
    }
}

impl<K: Key, V> IndexMut<K> for SlotMap<K, V> {
    fn index_mut(&mut self, key: K) -> &mut V {
        debug_assert!(self.contains_key(key), "stale slot map key {key:?}");
        let position = self.slots[key.raw().index() as usize].link as usize;
        &mut self.values[position]
    }
}

impl<'a, K: Key, V> IntoIterator for &'a SlotMap<K, V> {
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<'a, K: Key, V> IntoIterator for &'a mut SlotMap<K, V> {
    type Item = &'a mut V;
    type IntoIter = std::slice::IterMut<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter_mut()
    }
}

/// Key plus the map it belongs to.
///
/// Holds the key, never a position, so every access re-validates it.
pub struct Handle<'a, K: Key, V> {
    map: &'a SlotMap<K, V>,
    key: K,
}

impl<'a, K: Key, V> Handle<'a, K, V> {
    pub fn key(&self) -> K {
        self.key
    }

    pub fn is_valid(&self) -> bool {
        self.map.contains_key(self.key)
    }

    pub fn get(&self) -> Option<&'a V> {
        self.map.get(self.key)
    }
}

impl<K: Key, V> Clone for Handle<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: Key, V> Copy for Handle<'_, K, V> {}

/// Exclusive handle; can mutate or erase its element.
pub struct HandleMut<'a, K: Key, V> {
    map: &'a mut SlotMap<K, V>,
    key: K,
}

impl<'a, K: Key, V> HandleMut<'a, K, V> {
    pub fn key(&self) -> K {
        self.key
    }

    pub fn is_valid(&self) -> bool {
        self.map.contains_key(self.key)
    }

    pub fn get(&self) -> Option<&V> {
        self.map.get(self.key)
    }

    pub fn get_mut(&mut self) -> Option<&mut V> {
        self.map.get_mut(self.key)
    }

    /// Remove the element. No-op if it is already gone.
    pub fn erase(&mut self) -> Option<V> {
        self.map.remove(self.key)
    }

    /// Access to the whole map, e.g. to insert more values while keeping
    /// this handle around.
    pub fn map_mut(&mut self) -> &mut SlotMap<K, V> {
        self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::RawId;

    type Map<V> = SlotMap<RawId, V>;

    #[test]
    fn test_insert_and_get() {
        let mut map = Map::new();
        let a = map.insert("Hello");
        let b = map.insert("Testing");
        let c = map.insert("Goodbye");

        assert_eq!(map.len(), 3);
        assert_eq!(map.get(a), Some(&"Hello"));
        assert_eq!(map.get(b), Some(&"Testing"));
        assert_eq!(map[c], "Goodbye");
        assert_eq!(a.generation(), 1);
    }

    #[test]
    fn test_remove_swaps_last_into_hole() {
        let mut map = Map::new();
        let a = map.insert(1);
        let b = map.insert(2);
        let c = map.insert(3);

        assert_eq!(map.remove(a), Some(1));
        assert_eq!(map.values(), &[3, 2]);
        assert_eq!(map.get(c), Some(&3));
        assert_eq!(map.get(b), Some(&2));
        assert_eq!(map.key_at(0), Some(c));
    }

    #[test]
    fn test_remove_last_does_not_swap() {
        let mut map = Map::new();
        let a = map.insert(1);
        let b = map.insert(2);
        map.remove(b);
        assert_eq!(map.values(), &[1]);
        assert_eq!(map.get(a), Some(&1));
    }

    #[test]
    fn test_double_remove_is_ignored() {
        let mut map = Map::new();
        let a = map.insert("Hello");
        let b = map.insert("Testing");
        let c = map.insert("Goodbye");

        map.remove(a);
        assert_eq!(map.remove(a), None);
        map.remove(c);
        map.remove(a);

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(b), Some(&"Testing"));
        assert_eq!(map.remove(RawId::INVALID), None);
        assert_eq!(map.remove(RawId::new(1, 400)), None);
    }

    #[test]
    fn test_recycled_slot_gets_new_generation() {
        let mut map = Map::new();
        let old = map.insert(10);
        map.remove(old);
        let new = map.insert(20);

        assert_eq!(old.index(), new.index());
        assert_ne!(old.generation(), new.generation());
        assert_eq!(map.get(old), None);
        assert_eq!(map.get(new), Some(&20));
        assert_eq!(map.slot_count(), 1);
    }

    #[test]
    fn test_generation_wraps_to_one() {
        let mut map = Map::new();
        let key = map.insert(0u8);
        map.slots[key.index() as usize].generation = u32::MAX;
        let key = RawId::new(u32::MAX, key.index());
        assert!(map.contains_key(key));

        map.remove(key);
        let next = map.insert(1);
        assert_eq!(next.generation(), 1);
        assert!(!map.contains_key(key));
    }

    #[test]
    fn test_null_and_out_of_range_keys() {
        let mut map = Map::new();
        let key = map.insert(5);
        assert!(!map.contains_key(RawId::new(0, key.index())));
        assert!(!map.contains_key(RawId::new(1, 99)));
        assert!(map.get(RawId::INVALID).is_none());
    }

    #[test]
    fn test_clear_invalidates_all_keys() {
        let mut map = Map::new();
        let keys: Vec<_> = (0..5).map(|i| map.insert(i)).collect();
        map.clear();

        assert!(map.is_empty());
        for key in &keys {
            assert!(!map.contains_key(*key));
        }

        // Slots are recycled without resurrecting old keys
        let fresh = map.insert(42);
        assert!(keys.iter().all(|k| *k != fresh));
        assert_eq!(map.slot_count(), 5);
    }

    #[test]
    fn test_keys_snapshot() {
        let mut map = Map::new();
        let a = map.insert('a');
        let b = map.insert('b');
        let c = map.insert('c');
        map.remove(b);

        let keys = map.keys();
        assert_eq!(keys, vec![a, c]);

        // Snapshot survives structural changes
        for key in keys {
            map.remove(key);
        }
        assert!(map.is_empty());
    }

    #[test]
    fn test_iter_keyed_matches_get() {
        let mut map = Map::new();
        for i in 0..20 {
            map.insert(i);
        }
        let victims: Vec<_> = map.keys().into_iter().step_by(3).collect();
        for key in victims {
            map.remove(key);
        }
        for (key, value) in map.iter_keyed() {
            assert_eq!(map.get(key), Some(value));
        }
    }

    #[test]
    fn test_handle_survives_reallocation() {
        let mut map = Map::new();
        let key = map.insert(("TEST2", 3141));
        let doomed = map.insert(("doomed", 0));

        {
            let mut handle = map.handle_mut(key);
            let inner = handle.map_mut();
            inner.remove(doomed);
            for i in 0..10_000 {
                inner.insert(("FILL", i));
            }
            assert!(handle.is_valid());
            assert_eq!(handle.get().map(|v| v.1), Some(3141));
            if let Some(value) = handle.get_mut() {
                value.1 = 7;
            }
        }

        let handle = map.handle(key);
        assert_eq!(handle.get(), Some(&("TEST2", 7)));
    }

    #[test]
    fn test_handle_to_erased_element_is_invalid() {
        let mut map = Map::new();
        let key = map.insert(1);
        let mut handle = map.handle_mut(key);
        assert_eq!(handle.erase(), Some(1));
        assert!(!handle.is_valid());
        assert!(handle.get().is_none());
        assert_eq!(handle.erase(), None);
    }

    #[test]
    fn test_slot_capacity_limit() {
        assert_slot_available(0);
        assert_slot_available(FREE_LIST_END as usize - 1);
        let full = std::panic::catch_unwind(|| assert_slot_available(FREE_LIST_END as usize));
        assert!(full.is_err());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut map = Map::new();
        let key = map.insert(String::from("a"));
        let mut copy = map.clone();
        copy[key].push('b');
        assert_eq!(map[key], "a");
        assert_eq!(copy[key], "ab");
    }
}
