//! End-to-end scenarios driving a real `Syncer` against `MockPeerPool`,
//! covering the concrete cases and a sample of the universal invariants.

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{account_record, branch_with_one_child, leaf_node};
use statesync_common::{keccak256, EMPTY_BYTES_HASH, EMPTY_TRIE_ROOT, H256};
use statesync_p2p::mock::MockPeerPool;
use statesync_storage::{InMemoryNodeStore, NodeStore, StoreError};
use statesync_sync::{Config, SyncError, Syncer};
use tokio_util::sync::CancellationToken;

fn fast_config() -> Config {
    Config {
        max_state_fetch: 384,
        reply_timeout: Duration::from_millis(30),
        report_interval: Duration::from_secs(3600),
        scheduler_idle_backoff: Duration::from_millis(5),
        subtrie_depth: 64,
    }
}

/// Wraps an in-memory store to record the order commits happen in, so tests
/// can assert bottom-up commit ordering directly.
#[derive(Default)]
struct OrderTrackingStore {
    inner: InMemoryNodeStore,
    order: Mutex<Vec<H256>>,
}

impl NodeStore for OrderTrackingStore {
    fn put(&self, key: H256, value: Vec<u8>) -> Result<(), StoreError> {
        self.order.lock().expect("lock poisoned").push(key);
        self.inner.put(key, value)
    }

    fn get(&self, key: H256) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get(key)
    }
}

async fn run_to_completion(syncer: &mut Syncer, deadline: Duration) {
    tokio::time::timeout(deadline, syncer.run(CancellationToken::new()))
        .await
        .expect("sync did not terminate before the test deadline")
        .expect("sync failed");
}

#[tokio::test]
async fn s1_empty_state_needs_no_peers() {
    let store: Arc<dyn NodeStore> = Arc::new(InMemoryNodeStore::new());
    let pool = Arc::new(MockPeerPool::new(0, HashMap::new()));
    let mut syncer = Syncer::new(EMPTY_TRIE_ROOT, store.clone(), pool, fast_config());

    run_to_completion(&mut syncer, Duration::from_secs(1)).await;

    assert_eq!(syncer.committed_count(), 0);
}

#[tokio::test]
async fn s2_single_leaf_account_no_storage_no_code() {
    let leaf_bytes = leaf_node(
        &[0xa, 0xb],
        &account_record(0, 1000, EMPTY_TRIE_ROOT, EMPTY_BYTES_HASH),
    );
    let leaf_hash = keccak256(&leaf_bytes);
    let root_bytes = branch_with_one_child(3, leaf_hash);
    let root_hash = keccak256(&root_bytes);

    let mut network = HashMap::new();
    network.insert(root_hash, root_bytes);
    network.insert(leaf_hash, leaf_bytes);

    let store: Arc<dyn NodeStore> = Arc::new(InMemoryNodeStore::new());
    let pool = Arc::new(MockPeerPool::new(3, network));
    let mut syncer = Syncer::new(root_hash, store.clone(), pool, fast_config());

    run_to_completion(&mut syncer, Duration::from_secs(2)).await;

    assert_eq!(syncer.committed_count(), 2);
    assert!(store.get(root_hash).unwrap().is_some());
    assert!(store.get(leaf_hash).unwrap().is_some());
}

#[tokio::test]
async fn s3_account_with_non_empty_storage_commits_bottom_up() {
    let storage_leaf_bytes = leaf_node(&[0x1], b"storage-value");
    let storage_leaf_hash = keccak256(&storage_leaf_bytes);
    let storage_root_bytes = branch_with_one_child(5, storage_leaf_hash);
    let storage_root_hash = keccak256(&storage_root_bytes);

    let account_leaf_bytes = leaf_node(
        &[0x2, 0x3],
        &account_record(1, 2000, storage_root_hash, EMPTY_BYTES_HASH),
    );
    let account_leaf_hash = keccak256(&account_leaf_bytes);
    let account_root_bytes = branch_with_one_child(7, account_leaf_hash);
    let account_root_hash = keccak256(&account_root_bytes);

    let mut network = HashMap::new();
    network.insert(account_root_hash, account_root_bytes);
    network.insert(account_leaf_hash, account_leaf_bytes);
    network.insert(storage_root_hash, storage_root_bytes);
    network.insert(storage_leaf_hash, storage_leaf_bytes);

    let store = Arc::new(OrderTrackingStore::default());
    let store_dyn: Arc<dyn NodeStore> = store.clone();
    let pool = Arc::new(MockPeerPool::new(3, network));
    let mut syncer = Syncer::new(account_root_hash, store_dyn, pool, fast_config());

    run_to_completion(&mut syncer, Duration::from_secs(2)).await;

    assert_eq!(syncer.committed_count(), 4);
    let order = store.order.lock().unwrap();
    let storage_leaf_pos = order.iter().position(|h| *h == storage_leaf_hash).unwrap();
    let account_leaf_pos = order.iter().position(|h| *h == account_leaf_hash).unwrap();
    assert!(
        storage_leaf_pos < account_leaf_pos,
        "account leaf must not commit before its storage leaf"
    );
}

#[tokio::test]
async fn s4_account_with_code_is_stored_raw() {
    let code = vec![0x60, 0x00];
    let code_hash = keccak256(&code);

    let account_leaf_bytes = leaf_node(&[0x4], &account_record(0, 1, EMPTY_TRIE_ROOT, code_hash));
    let account_leaf_hash = keccak256(&account_leaf_bytes);
    let account_root_bytes = branch_with_one_child(1, account_leaf_hash);
    let account_root_hash = keccak256(&account_root_bytes);

    let mut network = HashMap::new();
    network.insert(account_root_hash, account_root_bytes);
    network.insert(account_leaf_hash, account_leaf_bytes);
    network.insert(code_hash, code.clone());

    let store: Arc<dyn NodeStore> = Arc::new(InMemoryNodeStore::new());
    let pool = Arc::new(MockPeerPool::new(3, network));
    let mut syncer = Syncer::new(account_root_hash, store.clone(), pool, fast_config());

    run_to_completion(&mut syncer, Duration::from_secs(2)).await;

    assert_eq!(syncer.committed_count(), 3);
    assert_eq!(store.get(code_hash).unwrap(), Some(code));
}

#[tokio::test]
async fn s5_like_fan_out_with_lossy_peer_still_terminates() {
    let mut network = HashMap::new();
    let mut children = vec![common::encode_bytes(&[]); 16];
    let mut leaf_hashes = Vec::new();
    for slot in 0..16u8 {
        let leaf_bytes = leaf_node(&[slot, slot], format!("account-{slot}").as_bytes());
        let leaf_hash = keccak256(&leaf_bytes);
        children[slot as usize] = common::encode_bytes(leaf_hash.as_bytes());
        network.insert(leaf_hash, leaf_bytes);
        leaf_hashes.push(leaf_hash);
    }
    children.push(common::encode_bytes(&[]));
    let root_bytes = common::encode_list(&children);
    let root_hash = keccak256(&root_bytes);
    network.insert(root_hash, root_bytes);

    let store: Arc<dyn NodeStore> = Arc::new(InMemoryNodeStore::new());
    let pool = Arc::new(MockPeerPool::new(4, network).with_drop_rate(0.3));
    let mut syncer = Syncer::new(root_hash, store.clone(), pool, fast_config());

    run_to_completion(&mut syncer, Duration::from_secs(5)).await;

    assert_eq!(syncer.committed_count(), 17);
    for hash in leaf_hashes {
        assert!(store.get(hash).unwrap().is_some());
    }
}

#[tokio::test]
async fn s6_adversarial_peer_corruption_recovers_via_timeout() {
    let leaf_bytes = leaf_node(&[0x9], b"adversarial-account");
    let leaf_hash = keccak256(&leaf_bytes);
    let root_bytes = branch_with_one_child(0, leaf_hash);
    let root_hash = keccak256(&root_bytes);

    let mut network = HashMap::new();
    network.insert(root_hash, root_bytes);
    network.insert(leaf_hash, leaf_bytes);

    let store: Arc<dyn NodeStore> = Arc::new(InMemoryNodeStore::new());
    // Every reply has a 50% chance of being corrupted in flight; with
    // repeated timeout-driven retries an honest copy eventually lands.
    let pool = Arc::new(MockPeerPool::new(3, network).with_corrupt_rate(0.5));
    let mut syncer = Syncer::new(root_hash, store.clone(), pool, fast_config());

    run_to_completion(&mut syncer, Duration::from_secs(5)).await;

    assert_eq!(syncer.committed_count(), 2);
    assert_eq!(keccak256(&store.get(leaf_hash).unwrap().unwrap()), leaf_hash);
}

#[tokio::test]
async fn cancellation_stops_the_loop_and_keeps_partial_state() {
    let leaf_bytes = leaf_node(&[0x1], b"never-arrives-in-time");
    let leaf_hash = keccak256(&leaf_bytes);
    let root_bytes = branch_with_one_child(0, leaf_hash);
    let root_hash = keccak256(&root_bytes);

    // An empty network: the root is never served, so the loop would spin
    // forever on idle-backoff until cancelled.
    let store: Arc<dyn NodeStore> = Arc::new(InMemoryNodeStore::new());
    let pool = Arc::new(MockPeerPool::new(2, HashMap::new()));
    let mut syncer = Syncer::new(root_hash, store.clone(), pool, fast_config());

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel_clone.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(2), syncer.run(cancel))
        .await
        .expect("run() must observe cancellation promptly");

    assert!(matches!(result, Err(SyncError::Cancelled)));
    assert_eq!(syncer.committed_count(), 0);
    assert!(store.get(leaf_hash).unwrap().is_none());
}
