//! Periodically reclaims peers and re-dispatches hashes whose reply has
//! taken longer than `REPLY_TIMEOUT`. Sleeps adaptively to the next known
//! deadline rather than polling on a fixed tick.

use std::time::{Duration, Instant};

use statesync_common::H256;
use statesync_p2p::PeerError;
use tracing::debug;

use crate::dispatcher::RequestDispatcher;
use crate::metrics::METRICS;
use crate::peer_registry::PeerRegistry;

pub struct TimeoutSweeper {
    reply_timeout: Duration,
}

impl TimeoutSweeper {
    pub fn new(reply_timeout: Duration) -> Self {
        Self { reply_timeout }
    }

    /// Runs one sweep pass: frees stale busy peers, collects and re-dispatches
    /// stale in-flight hashes, and returns how long to sleep before the next
    /// pass (the time until the earliest remaining in-flight entry expires,
    /// or `reply_timeout` itself if nothing is in flight).
    pub async fn sweep(
        &self,
        dispatcher: &mut RequestDispatcher,
        registry: &mut PeerRegistry,
    ) -> Result<Duration, PeerError> {
        let now = Instant::now();
        registry.release_stale(self.reply_timeout, now);

        let (stale, oldest) = dispatcher.take_stale(self.reply_timeout, now);
        if !stale.is_empty() {
            METRICS.timeouts.inc_by(stale.len() as u64);
            debug!(count = stale.len(), "re-dispatching timed-out hashes");
            self.redispatch(stale, dispatcher, registry).await?;
        }

        Ok(match oldest {
            Some(oldest_sent_at) => {
                let deadline = oldest_sent_at + self.reply_timeout;
                deadline.saturating_duration_since(Instant::now())
            }
            None => self.reply_timeout,
        })
    }

    async fn redispatch(
        &self,
        hashes: Vec<H256>,
        dispatcher: &mut RequestDispatcher,
        registry: &mut PeerRegistry,
    ) -> Result<(), PeerError> {
        dispatcher.request(hashes, registry, Duration::from_millis(50)).await
    }
}
