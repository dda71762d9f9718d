//! An in-memory peer pool for tests: peers all share one "honest network"
//! node set, with knobs to drop or corrupt replies so the sync crate can
//! exercise its timeout and bad-node recovery paths without a real
//! transport.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use statesync_common::H256;
use tokio::sync::mpsc;

use crate::message::Command;
use crate::peer::{PeerError, PeerId};
use crate::pool::PeerPool;

const CHANNEL_CAPACITY: usize = 4096;

pub struct MockPeerPool {
    peers: Vec<PeerId>,
    network: Arc<HashMap<H256, Vec<u8>>>,
    sender: mpsc::Sender<(PeerId, Command)>,
    receiver: Mutex<Option<mpsc::Receiver<(PeerId, Command)>>>,
    drop_rate: f64,
    corrupt_rate: f64,
    latency: Duration,
}

impl MockPeerPool {
    pub fn new(peer_count: usize, network: HashMap<H256, Vec<u8>>) -> Self {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            peers: (0..peer_count as u64).map(PeerId).collect(),
            network: Arc::new(network),
            sender,
            receiver: Mutex::new(Some(receiver)),
            drop_rate: 0.0,
            corrupt_rate: 0.0,
            latency: Duration::from_millis(1),
        }
    }

    pub fn with_drop_rate(mut self, rate: f64) -> Self {
        self.drop_rate = rate;
        self
    }

    pub fn with_corrupt_rate(mut self, rate: f64) -> Self {
        self.corrupt_rate = rate;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl PeerPool for MockPeerPool {
    fn peer_ids(&self) -> Vec<PeerId> {
        self.peers.clone()
    }

    async fn send_get_node_data(&self, peer: PeerId, hashes: Vec<H256>) -> Result<(), PeerError> {
        if !self.peers.contains(&peer) {
            return Err(PeerError::Disconnected(peer));
        }
        let sender = self.sender.clone();
        let network = self.network.clone();
        let drop_rate = self.drop_rate;
        let corrupt_rate = self.corrupt_rate;
        let latency = self.latency;

        tokio::spawn(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            let mut blobs = Vec::new();
            for hash in hashes {
                if drop_rate > 0.0 && rand::random::<f64>() < drop_rate {
                    continue;
                }
                let Some(bytes) = network.get(&hash) else {
                    continue;
                };
                let mut bytes = bytes.clone();
                if corrupt_rate > 0.0 && rand::random::<f64>() < corrupt_rate {
                    match bytes.first_mut() {
                        Some(byte) => *byte ^= 0xff,
                        None => bytes.push(0xff),
                    }
                }
                blobs.push(bytes);
            }
            if !blobs.is_empty() {
                let _ = sender.send((peer, Command::NodeData(blobs))).await;
            }
        });
        Ok(())
    }

    fn subscribe(&self) -> mpsc::Receiver<(PeerId, Command)> {
        self.receiver
            .lock()
            .expect("lock poisoned")
            .take()
            .expect("MockPeerPool::subscribe called more than once")
    }
}
