//! The sync scheduler: the set of not-yet-committed requests, the priority
//! queue over them, and the bottom-up commit that drains it.
//!
//! Commit propagation is iterative, not recursive (a worklist rather than a
//! call stack walking `parents`), specifically so a long chain of extension
//! nodes or a deep account trie can't blow the stack the way a naive
//! recursive commit would.

use std::collections::{BinaryHeap, HashMap, HashSet};
use std::cmp::Reverse;
use std::sync::Arc;

use statesync_common::{keccak256, H256};
use statesync_storage::NodeStore;
use statesync_trie::{ChildRef, Node};

use crate::account;
use crate::error::{ProcessError, SyncError};
use crate::metrics::METRICS;

/// Whether a committed leaf should trigger discovery of further sub-roots.
/// A tagged variant rather than a trait object: the only two hooks this
/// synchronizer ever needs are "this is an account leaf" and "no-op", and a
/// closed enum keeps `SyncRequest` plain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafHook {
    None,
    Account,
}

#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub hash: H256,
    pub depth: u32,
    pub parents: HashSet<H256>,
    pub dependencies: u32,
    pub data: Option<Vec<u8>>,
    pub is_raw: bool,
    pub leaf_hook: LeafHook,
}

impl SyncRequest {
    fn new(hash: H256, depth: u32, parent: Option<H256>, is_raw: bool, leaf_hook: LeafHook) -> Self {
        let mut parents = HashSet::new();
        if let Some(parent) = parent {
            parents.insert(parent);
        }
        Self {
            hash,
            depth,
            parents,
            dependencies: 0,
            data: None,
            is_raw,
            leaf_hook,
        }
    }
}

pub struct SyncScheduler {
    requests: HashMap<H256, SyncRequest>,
    queue: BinaryHeap<Reverse<(u32, u64, H256)>>,
    next_seq: u64,
    committed_count: u64,
    store: Arc<dyn NodeStore>,
    /// Depth assigned to storage-root/code-hash requests scheduled from an
    /// account leaf (§4.1's account leaf callback); read by `account::on_account_leaf`.
    subtrie_depth: u32,
}

impl SyncScheduler {
    /// Seeds the scheduler for a full state trie sync: the root's leaves are
    /// account records, so the account leaf hook is attached from the start.
    pub fn new(root: H256, store: Arc<dyn NodeStore>, subtrie_depth: u32) -> Self {
        Self::for_subtrie(root, store, LeafHook::Account, subtrie_depth)
    }

    /// Seeds the scheduler for an arbitrary subtrie with a caller-chosen leaf
    /// hook. Used by tests that want plain trie reachability without account
    /// decoding, and internally this is just what `new` delegates to.
    pub fn for_subtrie(root: H256, store: Arc<dyn NodeStore>, leaf_hook: LeafHook, subtrie_depth: u32) -> Self {
        let mut scheduler = Self {
            requests: HashMap::new(),
            queue: BinaryHeap::new(),
            next_seq: 0,
            committed_count: 0,
            store,
            subtrie_depth,
        };
        // The well-known empty trie root never has a node fetched for it:
        // there is nothing upstream that could ever serve it, and nothing
        // downstream ever looks it up since every schedule site already
        // skips it explicitly (see `account::on_account_leaf`).
        if root != statesync_common::EMPTY_TRIE_ROOT {
            scheduler.insert_request(root, 0, None, false, leaf_hook);
        }
        scheduler
    }

    pub fn has_pending(&self) -> bool {
        !self.requests.is_empty()
    }

    pub fn committed_count(&self) -> u64 {
        self.committed_count
    }

    /// Hashes known but not yet popped into a dispatch batch.
    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    /// Depth assigned to storage-root/code-hash requests scheduled from an
    /// account leaf. Read by `account::on_account_leaf`.
    pub(crate) fn subtrie_depth(&self) -> u32 {
        self.subtrie_depth
    }

    /// Pops up to `n` hashes in `(depth asc, insertion order)` priority.
    /// Popped hashes stay in `requests` (they are in flight, not committed)
    /// but leave the queue for good: a timed-out hash is never re-queued
    /// here, it is re-dispatched directly to a peer by `RequestDispatcher`
    /// (driven by the timeout sweeper), using the `requests` entry that was
    /// never removed. The scheduler only learns about it again once a
    /// `process` call for that hash finally succeeds.
    pub fn next_batch(&mut self, n: usize) -> Vec<H256> {
        let mut batch = Vec::with_capacity(n.min(self.queue.len()));
        while batch.len() < n {
            let Some(Reverse((_, _, hash))) = self.queue.pop() else {
                break;
            };
            batch.push(hash);
        }
        batch
    }

    pub fn process(&mut self, items: Vec<(H256, Vec<u8>)>) -> Result<(), SyncError> {
        for (hash, bytes) in items {
            match self.process_one(hash, bytes) {
                Ok(()) => {}
                Err(ProcessError::BadNode(reason)) => {
                    METRICS.bad_nodes.inc();
                    tracing::debug!(%hash, %reason, "dropping bad node reply");
                }
                Err(ProcessError::AlreadyProcessed) => {
                    tracing::trace!(%hash, "duplicate or stale reply ignored");
                }
                Err(ProcessError::Store(store_err)) => return Err(SyncError::StorePutFailure(store_err)),
            }
        }
        Ok(())
    }

    fn process_one(&mut self, hash: H256, bytes: Vec<u8>) -> Result<(), ProcessError> {
        let (depth, is_raw, leaf_hook) = match self.requests.get(&hash) {
            None => return Err(ProcessError::AlreadyProcessed),
            Some(req) if req.data.is_some() => return Err(ProcessError::AlreadyProcessed),
            Some(req) => (req.depth, req.is_raw, req.leaf_hook),
        };

        if keccak256(&bytes) != hash {
            return Err(ProcessError::BadNode("keccak256(bytes) != requested hash".to_string()));
        }
        METRICS.nodes_processed.inc();

        if is_raw {
            self.requests.get_mut(&hash).expect("checked above").data = Some(bytes);
            self.commit(hash)?;
            return Ok(());
        }

        let node = statesync_trie::decode(&bytes).map_err(|e| ProcessError::BadNode(e.to_string()))?;
        let new_deps = self.discover_children(&node, hash, depth + 1, leaf_hook)?;

        let req = self.requests.get_mut(&hash).expect("checked above");
        req.data = Some(bytes);
        req.dependencies = new_deps;

        if new_deps == 0 {
            self.commit(hash)?;
        }
        Ok(())
    }

    /// Walks `node`'s children (and, recursively, any embedded grandchildren),
    /// scheduling hash-referenced ones and firing the leaf hook. Returns the
    /// number of new not-yet-committed dependencies this contributes to
    /// `owner` (the nearest addressable ancestor hash — itself for a
    /// top-level call, or the enclosing request for an embedded node).
    fn discover_children(
        &mut self,
        node: &Node,
        owner: H256,
        child_depth: u32,
        leaf_hook: LeafHook,
    ) -> Result<u32, ProcessError> {
        let mut count = 0u32;

        if let (true, Node::Leaf(leaf)) = (node.is_leaf(), node) {
            if leaf_hook == LeafHook::Account {
                count += account::on_account_leaf(self, &leaf.value, owner)?;
            }
        }

        for child in node.children() {
            match child {
                ChildRef::Hash(child_hash) => {
                    if self.schedule_child(*child_hash, owner, child_depth, leaf_hook, false)? {
                        count += 1;
                    }
                }
                ChildRef::Embedded(embedded) => {
                    count += self.discover_children(embedded, owner, child_depth, leaf_hook)?;
                }
            }
        }
        Ok(count)
    }

    /// Creates or merges a child request. Returns `true` if this added a new
    /// not-yet-committed dependency under `owner` (a brand new request, or a
    /// new parent edge on an existing one); `false` if the child is already
    /// resolved (present in the store) or `owner` was already its parent.
    pub(crate) fn schedule_child(
        &mut self,
        child_hash: H256,
        owner: H256,
        depth: u32,
        leaf_hook: LeafHook,
        is_raw: bool,
    ) -> Result<bool, ProcessError> {
        if self.store.get(child_hash)?.is_some() {
            return Ok(false);
        }
        if let Some(existing) = self.requests.get_mut(&child_hash) {
            return Ok(existing.parents.insert(owner));
        }
        self.insert_request(child_hash, depth, Some(owner), is_raw, leaf_hook);
        Ok(true)
    }

    fn insert_request(&mut self, hash: H256, depth: u32, parent: Option<H256>, is_raw: bool, leaf_hook: LeafHook) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.requests
            .insert(hash, SyncRequest::new(hash, depth, parent, is_raw, leaf_hook));
        self.queue.push(Reverse((depth, seq, hash)));
        METRICS.queued.set(self.queue.len() as i64);
    }

    fn commit(&mut self, hash: H256) -> Result<(), ProcessError> {
        let mut worklist = vec![hash];
        while let Some(h) = worklist.pop() {
            let req = self.requests.remove(&h).expect("commit target must be a live request");
            let data = req.data.expect("commit target must have received its data");
            self.store.put(h, data)?;
            self.committed_count += 1;
            METRICS.nodes_committed.inc();

            for parent in req.parents {
                let Some(parent_req) = self.requests.get_mut(&parent) else {
                    continue;
                };
                parent_req.dependencies = parent_req.dependencies.saturating_sub(1);
                if parent_req.dependencies == 0 && parent_req.data.is_some() {
                    worklist.push(parent);
                }
            }
        }
        METRICS.queued.set(self.queue.len() as i64);
        Ok(())
    }
}
