//! Tracks which peers currently hold an outstanding request and hands out
//! idle ones. Busy-ness lives here rather than on the peer pool itself so
//! any `PeerPool` implementation can be wrapped without changes.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use statesync_p2p::{PeerId, PeerPool};

pub struct PeerRegistry {
    pool: std::sync::Arc<dyn PeerPool>,
    busy: HashMap<PeerId, Instant>,
}

impl PeerRegistry {
    pub fn new(pool: std::sync::Arc<dyn PeerPool>) -> Self {
        Self {
            pool,
            busy: HashMap::new(),
        }
    }

    pub fn idle_peers(&self) -> Vec<PeerId> {
        self.pool
            .peer_ids()
            .into_iter()
            .filter(|id| !self.busy.contains_key(id))
            .collect()
    }

    /// Cooperatively waits until at least one peer is idle, then returns a
    /// uniformly-random choice among them. No cryptographic requirement on
    /// the RNG: spreading load and retries is the only goal.
    pub async fn pick_idle(&self, poll_interval: Duration) -> PeerId {
        loop {
            let idle = self.idle_peers();
            if let Some(peer) = idle.choose(&mut rand::thread_rng()) {
                return *peer;
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    pub fn mark_busy(&mut self, peer: PeerId, at: Instant) {
        self.busy.insert(peer, at);
    }

    pub fn mark_idle(&mut self, peer: PeerId) {
        self.busy.remove(&peer);
    }

    /// Frees every peer whose busy marker is older than `timeout`, returning
    /// how many were cleared. Called by the timeout sweeper.
    pub fn release_stale(&mut self, timeout: Duration, now: Instant) -> usize {
        let before = self.busy.len();
        self.busy.retain(|_, sent_at| now.duration_since(*sent_at) < timeout);
        before - self.busy.len()
    }
}
