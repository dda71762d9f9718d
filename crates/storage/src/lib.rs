//! The node store: a write-through key-value sink keyed by 32-byte hash.
//!
//! This crate is an external collaborator of the sync scheduler — it has no
//! opinion on tries, peers, or scheduling, only on persisting opaque blobs
//! under their content-address. No schema versioning is needed because
//! content-addressing *is* the schema.

pub mod error;
pub mod memory;
#[cfg(feature = "redb")]
pub mod redb_store;

pub use error::StoreError;
pub use memory::InMemoryNodeStore;
#[cfg(feature = "redb")]
pub use redb_store::RedbNodeStore;
use statesync_common::H256;

/// The storage contract the sync scheduler writes finished nodes into.
///
/// `put` must be durable and idempotent: writing the same `(key, value)`
/// pair twice is a no-op from the caller's perspective, and a successful
/// `put` must survive a crash immediately after it returns (within whatever
/// durability guarantee the backend gives — the in-memory backend used in
/// tests gives none, which is fine for its purpose).
pub trait NodeStore: Send + Sync {
    fn put(&self, key: H256, value: Vec<u8>) -> Result<(), StoreError>;
    fn get(&self, key: H256) -> Result<Option<Vec<u8>>, StoreError>;
}

// Blanket impl so callers can hand around `Arc<dyn NodeStore>` or a
// concrete type interchangeably.
impl<T: NodeStore + ?Sized> NodeStore for std::sync::Arc<T> {
    fn put(&self, key: H256, value: Vec<u8>) -> Result<(), StoreError> {
        (**self).put(key, value)
    }
    fn get(&self, key: H256) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }
}
