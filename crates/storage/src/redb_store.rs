use redb::{Database, TableDefinition};
use std::path::Path;

use statesync_common::H256;

use crate::{NodeStore, StoreError};

const TRIE_NODES_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("TrieNodes");

/// A [`redb`]-backed node store for long-lived syncs that should survive a
/// process restart's worth of disk I/O (the scheduler's in-memory request
/// bookkeeping does not survive restarts, but the nodes it already wrote
/// do, which speeds up a from-scratch resync).
pub struct RedbNodeStore {
    db: Database,
}

impl RedbNodeStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(|e| StoreError::Redb(e.to_string()))?;
        let write_txn = db.begin_write().map_err(|e| StoreError::Redb(e.to_string()))?;
        {
            write_txn
                .open_table(TRIE_NODES_TABLE)
                .map_err(|e| StoreError::Redb(e.to_string()))?;
        }
        write_txn.commit().map_err(|e| StoreError::Redb(e.to_string()))?;
        Ok(Self { db })
    }
}

impl NodeStore for RedbNodeStore {
    fn put(&self, key: H256, value: Vec<u8>) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write().map_err(|e| StoreError::Redb(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(TRIE_NODES_TABLE)
                .map_err(|e| StoreError::Redb(e.to_string()))?;
            table
                .insert(key.as_bytes(), value.as_slice())
                .map_err(|e| StoreError::Redb(e.to_string()))?;
        }
        write_txn.commit().map_err(|e| StoreError::Redb(e.to_string()))
    }

    fn get(&self, key: H256) -> Result<Option<Vec<u8>>, StoreError> {
        let read_txn = self.db.begin_read().map_err(|e| StoreError::Redb(e.to_string()))?;
        let table = read_txn
            .open_table(TRIE_NODES_TABLE)
            .map_err(|e| StoreError::Redb(e.to_string()))?;
        Ok(table
            .get(key.as_bytes())
            .map_err(|e| StoreError::Redb(e.to_string()))?
            .map(|guard| guard.value().to_vec()))
    }
}
