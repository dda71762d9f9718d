//! Drains the inbound peer message queue, verifies hashes on a worker pool,
//! and feeds verified nodes into the scheduler.

use rayon::prelude::*;
use statesync_common::{keccak256, H256};
use statesync_p2p::{Command, PeerId};
use tokio::sync::mpsc;
use tracing::debug;

use crate::dispatcher::RequestDispatcher;
use crate::error::SyncError;
use crate::peer_registry::PeerRegistry;
use crate::scheduler::SyncScheduler;

pub struct ReplyHandler {
    inbound: mpsc::Receiver<(PeerId, Command)>,
}

impl ReplyHandler {
    pub fn new(inbound: mpsc::Receiver<(PeerId, Command)>) -> Self {
        Self { inbound }
    }

    /// Drains every message currently buffered without blocking, applying
    /// each to the scheduler. Returns once the queue is momentarily empty so
    /// the main loop can go on to dispatch the next batch.
    pub async fn drain(
        &mut self,
        scheduler: &mut SyncScheduler,
        dispatcher: &mut RequestDispatcher,
        registry: &mut PeerRegistry,
    ) -> Result<(), SyncError> {
        loop {
            let (peer, command) = match self.inbound.try_recv() {
                Ok(msg) => msg,
                Err(mpsc::error::TryRecvError::Empty) => return Ok(()),
                Err(mpsc::error::TryRecvError::Disconnected) => return Ok(()),
            };
            self.handle(peer, command, scheduler, dispatcher, registry).await?;
        }
    }

    /// Blocks until at least one message arrives, then drains the rest of
    /// the buffer the same way `drain` does. Used by the main loop while it
    /// waits out the idle backoff instead of busy-polling.
    pub async fn recv_or_wait(
        &mut self,
        scheduler: &mut SyncScheduler,
        dispatcher: &mut RequestDispatcher,
        registry: &mut PeerRegistry,
    ) -> Result<(), SyncError> {
        if let Some((peer, command)) = self.inbound.recv().await {
            self.handle(peer, command, scheduler, dispatcher, registry).await?;
        }
        self.drain(scheduler, dispatcher, registry).await
    }

    async fn handle(
        &mut self,
        peer: PeerId,
        command: Command,
        scheduler: &mut SyncScheduler,
        dispatcher: &mut RequestDispatcher,
        registry: &mut PeerRegistry,
    ) -> Result<(), SyncError> {
        let blobs = match command {
            Command::NodeData(blobs) => blobs,
            Command::Other(kind) => {
                debug!(%peer, kind, "ignoring non-NodeData command");
                return Ok(());
            }
        };

        registry.mark_idle(peer);

        // Hashing is the CPU-bound step the spec calls out for worker-pool
        // offload. `spawn_blocking` moves the actual `par_iter` fold onto
        // tokio's blocking pool so this await point doesn't stall message
        // intake for other peers while a large batch hashes.
        let verified: Vec<(H256, Vec<u8>)> = tokio::task::spawn_blocking(move || {
            blobs.into_par_iter().map(|blob| (keccak256(&blob), blob)).collect()
        })
        .await
        .expect("hash offload task panicked");

        for (hash, _) in &verified {
            dispatcher.clear(*hash);
        }
        scheduler.process(verified)
    }
}
