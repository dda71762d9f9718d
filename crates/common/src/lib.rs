//! Shared primitives used across the state synchronizer workspace.
//!
//! This crate is intentionally small: it hosts the 32-byte hash type every
//! other crate keys its data by, the keccak256 primitive used for content
//! addressing, and the two well-known empty-trie/empty-code constants.

pub mod constants;

pub use ethereum_types::H256;
use sha3::{Digest, Keccak256};

/// keccak256 of an arbitrary byte string.
///
/// This is the identity function for every hash in the trie: a node's key
/// is always the keccak256 of its own encoded bytes.
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    H256::from_slice(&hasher.finalize())
}

pub use constants::{EMPTY_BYTES_HASH, EMPTY_TRIE_ROOT};
