use statesync_rlp::error::RLPDecodeError;
use thiserror::Error;

/// Everything that can go wrong decoding a node's raw bytes into structure.
/// Surfaces to callers as the scheduler's `BadNode` case: the blob is
/// dropped and the hash is retried, it is never treated as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrieError {
    #[error("failed to RLP-decode node: {0}")]
    Rlp(#[from] RLPDecodeError),
    #[error("a trie node must RLP-decode to a 2-item (leaf/extension) or 17-item (branch) list, got {0} items")]
    InvalidItemCount(usize),
    #[error("branch node value slot must be a string")]
    InvalidBranchValue,
}
