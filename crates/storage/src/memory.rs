use std::collections::HashMap;
use std::sync::RwLock;

use statesync_common::H256;

use crate::{NodeStore, StoreError};

/// An in-memory node store, used in tests and as the default for
/// short-lived or throwaway syncs. Provides no durability whatsoever: a
/// process crash loses everything, which is acceptable since the scheduler
/// itself is explicitly in-memory and does not survive restarts either.
#[derive(Debug, Default)]
pub struct InMemoryNodeStore {
    nodes: RwLock<HashMap<H256, Vec<u8>>>,
}

impl InMemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NodeStore for InMemoryNodeStore {
    fn put(&self, key: H256, value: Vec<u8>) -> Result<(), StoreError> {
        self.nodes.write().expect("lock poisoned").insert(key, value);
        Ok(())
    }

    fn get(&self, key: H256) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.nodes.read().expect("lock poisoned").get(&key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_roundtrips() {
        let store = InMemoryNodeStore::new();
        let key = H256::from_low_u64_be(1);
        store.put(key, vec![1, 2, 3]).unwrap();
        assert_eq!(store.get(key).unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn get_of_missing_key_is_none() {
        let store = InMemoryNodeStore::new();
        assert_eq!(store.get(H256::zero()).unwrap(), None);
    }

    #[test]
    fn put_is_idempotent() {
        let store = InMemoryNodeStore::new();
        let key = H256::from_low_u64_be(7);
        store.put(key, vec![9]).unwrap();
        store.put(key, vec![9]).unwrap();
        assert_eq!(store.len(), 1);
    }
}
