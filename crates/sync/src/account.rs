//! The account leaf hook: decodes an account record found at a state-trie
//! leaf and schedules its storage subtrie and bytecode as further requests.

use statesync_common::{EMPTY_BYTES_HASH, EMPTY_TRIE_ROOT, H256};

use crate::error::ProcessError;
use crate::scheduler::{LeafHook, SyncScheduler};

/// Storage-root and code-hash requests rank below any unvisited account-trie
/// request, so the account trie's breadth finishes before subtries are
/// chased deeply. Only the ordering relative to account-trie depth matters,
/// not the absolute value.
fn account_leaf_value(bytes: &[u8]) -> Result<(H256, H256), ProcessError> {
    let items = statesync_rlp::decode(bytes)
        .map_err(|e| ProcessError::BadNode(e.to_string()))?
        .into_list()
        .map_err(|e| ProcessError::BadNode(e.to_string()))?;
    if items.len() != 4 {
        return Err(ProcessError::BadNode(format!("account record has {} fields, want 4", items.len())));
    }
    let mut items = items.into_iter();
    let _nonce = items.next().expect("checked len == 4");
    let _balance = items.next().expect("checked len == 4");
    let storage_root = items
        .next()
        .expect("checked len == 4")
        .as_bytes()
        .map_err(|e| ProcessError::BadNode(e.to_string()))?
        .to_vec();
    let code_hash = items
        .next()
        .expect("checked len == 4")
        .as_bytes()
        .map_err(|e| ProcessError::BadNode(e.to_string()))?
        .to_vec();

    if storage_root.len() != 32 {
        return Err(ProcessError::BadNode("account storage_root is not 32 bytes".to_string()));
    }
    if code_hash.len() != 32 {
        return Err(ProcessError::BadNode("account code_hash is not 32 bytes".to_string()));
    }
    Ok((H256::from_slice(&storage_root), H256::from_slice(&code_hash)))
}

/// Invoked by the scheduler on every leaf reached from a request whose
/// `leaf_hook` is `Account`. Returns the number of new dependencies this
/// adds under `owner` (the account leaf's own hash).
pub(crate) fn on_account_leaf(
    scheduler: &mut SyncScheduler,
    leaf_value: &[u8],
    owner: H256,
) -> Result<u32, ProcessError> {
    let (storage_root, code_hash) = account_leaf_value(leaf_value)?;
    let subtrie_depth = scheduler.subtrie_depth();
    let mut count = 0;

    if storage_root != EMPTY_TRIE_ROOT
        && scheduler.schedule_child(storage_root, owner, subtrie_depth, LeafHook::None, false)?
    {
        count += 1;
    }
    if code_hash != EMPTY_BYTES_HASH
        && scheduler.schedule_child(code_hash, owner, subtrie_depth, LeafHook::None, true)?
    {
        count += 1;
    }
    Ok(count)
}
