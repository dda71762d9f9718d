//! Batches pending hashes into protocol-sized chunks and sends them to idle
//! peers, recording per-hash in-flight timestamps so the timeout sweeper
//! knows what to re-request.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use statesync_common::H256;
use statesync_p2p::PeerPool;
use tracing::debug;

use crate::metrics::METRICS;
use crate::peer_registry::PeerRegistry;

pub struct RequestDispatcher {
    pool: Arc<dyn PeerPool>,
    max_state_fetch: usize,
    in_flight: HashMap<H256, Instant>,
}

impl RequestDispatcher {
    pub fn new(pool: Arc<dyn PeerPool>, max_state_fetch: usize) -> Self {
        Self {
            pool,
            max_state_fetch,
            in_flight: HashMap::new(),
        }
    }

    /// Splits `hashes` into batches of at most `max_state_fetch`, waiting for
    /// an idle peer before each one. A peer that is already busy is never
    /// selected — `PeerRegistry` enforces that.
    pub async fn request(
        &mut self,
        hashes: Vec<H256>,
        registry: &mut PeerRegistry,
        idle_poll_interval: Duration,
    ) -> Result<(), statesync_p2p::PeerError> {
        for batch in hashes.chunks(self.max_state_fetch) {
            let peer = registry.pick_idle(idle_poll_interval).await;
            let now = Instant::now();
            for hash in batch {
                self.in_flight.insert(*hash, now);
            }
            METRICS.in_flight.set(self.in_flight.len() as i64);
            debug!(%peer, count = batch.len(), "dispatching GetNodeData batch");
            self.pool.send_get_node_data(peer, batch.to_vec()).await?;
            registry.mark_busy(peer, now);
        }
        Ok(())
    }

    /// Clears a hash's in-flight marker. Absence is tolerated: the timeout
    /// sweeper may already have reclaimed it.
    pub fn clear(&mut self, hash: H256) {
        self.in_flight.remove(&hash);
        METRICS.in_flight.set(self.in_flight.len() as i64);
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns every hash whose request is older than `timeout`, and the
    /// oldest remaining in-flight timestamp (used by the sweeper to size its
    /// next sleep). Stale hashes are removed from the in-flight table; the
    /// caller is responsible for re-dispatching them.
    pub fn take_stale(&mut self, timeout: Duration, now: Instant) -> (Vec<H256>, Option<Instant>) {
        let mut stale = Vec::new();
        self.in_flight.retain(|hash, sent_at| {
            if now.duration_since(*sent_at) >= timeout {
                stale.push(*hash);
                false
            } else {
                true
            }
        });
        METRICS.in_flight.set(self.in_flight.len() as i64);
        let oldest = self.in_flight.values().min().copied();
        (stale, oldest)
    }
}
