//! Bootstrap binary for the state synchronizer.
//!
//! Peer transport, handshake, and encryption are out of scope for this
//! workspace (see the sync crate's module docs), so this binary wires the
//! scheduler up to the in-memory mock peer pool seeded from a local file
//! standing in for "the network" — enough to drive a real sync end to end
//! without a live node to talk to.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use statesync_common::H256;
use statesync_p2p::mock::MockPeerPool;
use statesync_storage::{NodeStore, RedbNodeStore};
use statesync_sync::{Config, Syncer};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "statesync", about = "Reconstructs a state trie from a root hash")]
struct Args {
    /// 32-byte hex root hash to sync from, with or without a 0x prefix.
    #[arg(long)]
    root: String,

    /// Path to the redb-backed node store file.
    #[arg(long)]
    store_path: PathBuf,

    /// Path to a file of hex-encoded `hash:blob` pairs, one per line, used
    /// to seed the mock peer network this binary talks to in the absence
    /// of a real transport.
    #[arg(long)]
    network_fixture: Option<PathBuf>,

    /// Number of mock peers to simulate.
    #[arg(long, default_value_t = 4)]
    peers: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let root = parse_hash(&args.root)?;

    let store: Arc<dyn NodeStore> = Arc::new(RedbNodeStore::open(&args.store_path)?);
    let network = load_network_fixture(args.network_fixture.as_deref())?;
    let pool = Arc::new(MockPeerPool::new(args.peers, network));

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("received interrupt, winding down");
        shutdown.cancel();
    });

    let mut syncer = Syncer::new(root, store, pool, Config::from_env());
    match syncer.run(cancel).await {
        Ok(()) => {
            tracing::info!(committed = syncer.committed_count(), "sync finished");
            Ok(())
        }
        Err(statesync_sync::SyncError::Cancelled) => {
            tracing::info!(committed = syncer.committed_count(), "sync cancelled, partial state kept");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn parse_hash(s: &str) -> anyhow::Result<H256> {
    let bytes = hex::decode(s.trim_start_matches("0x"))?;
    if bytes.len() != 32 {
        anyhow::bail!("root hash must be 32 bytes, got {}", bytes.len());
    }
    Ok(H256::from_slice(&bytes))
}

fn load_network_fixture(path: Option<&std::path::Path>) -> anyhow::Result<HashMap<H256, Vec<u8>>> {
    let Some(path) = path else {
        return Ok(HashMap::new());
    };
    let contents = std::fs::read_to_string(path)?;
    let mut network = HashMap::new();
    for line in contents.lines().filter(|l| !l.trim().is_empty()) {
        let (hash_hex, blob_hex) = line
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("malformed fixture line: {line}"))?;
        let hash_bytes = hex::decode(hash_hex.trim())?;
        if hash_bytes.len() != 32 {
            anyhow::bail!("fixture hash must be 32 bytes: {line}");
        }
        network.insert(H256::from_slice(&hash_bytes), hex::decode(blob_hex.trim())?);
    }
    Ok(network)
}
