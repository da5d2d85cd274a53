use packed_ecs::prelude::*;
use std::collections::HashSet;

packed_ecs::new_key_type! {
    pub struct ItemKey;
}

#[test]
fn test_erase_keeps_survivors_dense() {
    let mut map: SlotMap<ItemKey, u32> = SlotMap::new();
    let keys: Vec<_> = (0..100).map(|i| map.insert(i)).collect();

    for key in keys.iter().step_by(3) {
        map.remove(*key);
    }

    assert_eq!(map.len(), 66);
    assert_eq!(map.values().len(), map.len());
    for (i, key) in keys.iter().enumerate() {
        if i % 3 == 0 {
            assert!(!map.contains_key(*key));
            assert_eq!(map.get(*key), None);
        } else {
            assert_eq!(map.get(*key), Some(&(i as u32)));
        }
    }
}

#[test]
fn test_reused_slot_rejects_old_key() {
    let mut map: SlotMap<ItemKey, &str> = SlotMap::new();
    let a = map.insert("a");
    map.remove(a);
    let b = map.insert("b");

    assert_eq!(a.index(), b.index());
    assert_ne!(a.generation(), b.generation());
    assert_eq!(map.get(a), None);
    assert_eq!(map.get(b), Some(&"b"));

    // Erasing the stale key must not touch the new occupant
    assert_eq!(map.remove(a), None);
    assert_eq!(map.get(b), Some(&"b"));
}

#[test]
fn test_handle_survives_reallocation() {
    let mut map: SlotMap<ItemKey, u64> = SlotMap::with_capacity(1);
    let first = map.insert(7);
    for i in 0..10_000 {
        map.insert(i);
    }
    let removed: Vec<_> = map.keys().into_iter().skip(1).step_by(2).collect();
    for key in removed {
        map.remove(key);
    }

    let handle = map.handle(first);
    assert!(handle.is_valid());
    assert_eq!(handle.get(), Some(&7));
}

#[test]
fn test_keys_snapshot_matches_values() {
    let mut map: SlotMap<ItemKey, usize> = SlotMap::new();
    for i in 0..32 {
        map.insert(i);
    }
    let keys = map.keys();
    let unique: HashSet<_> = keys.iter().copied().collect();
    assert_eq!(unique.len(), 32);

    for key in &keys {
        map.remove(*key);
    }
    assert!(map.is_empty());
    assert!(keys.iter().all(|key| !map.contains_key(*key)));
}
