//! The state synchronizer: reconstructs a hexary Patricia trie (accounts,
//! their storage subtries, and contract bytecode) from a peer pool given
//! only its root hash, writing every verified node into a [`NodeStore`].
//!
//! Everything below the scheduler is an external collaborator: the peer
//! transport ([`statesync_p2p`]), the trie node decoder ([`statesync_trie`]),
//! and the backing key-value store ([`statesync_storage`]) are all consumed
//! as already-given contracts, not reimplemented here.

pub mod account;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod peer_registry;
pub mod reply;
pub mod reporter;
pub mod scheduler;
pub mod sweeper;

pub use config::Config;
pub use error::{ProcessError, SyncError};
pub use scheduler::{LeafHook, SyncScheduler};

use std::sync::Arc;
use std::time::Instant;

use statesync_common::H256;
use statesync_p2p::PeerPool;
use statesync_storage::NodeStore;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::dispatcher::RequestDispatcher;
use crate::peer_registry::PeerRegistry;
use crate::reply::ReplyHandler;
use crate::reporter::ProgressReporter;
use crate::sweeper::TimeoutSweeper;

/// Owns every sync component and drives the main loop described in the
/// spec: tick, pull a batch, dispatch it, and react to replies and timeouts
/// until nothing is left pending.
///
/// The sweeper and reporter are not spawned as separate tasks: the spec's
/// "cooperative single-threaded control plane" is modeled as a single loop
/// that interleaves dispatch, reply draining, and periodic sweeps/reports
/// rather than as independent OS threads sharing this state.
pub struct Syncer {
    scheduler: SyncScheduler,
    dispatcher: RequestDispatcher,
    registry: PeerRegistry,
    replies: ReplyHandler,
    sweeper: TimeoutSweeper,
    reporter: ProgressReporter,
    config: Config,
    next_sweep_at: Instant,
}

impl Syncer {
    pub fn new(root: H256, store: Arc<dyn NodeStore>, pool: Arc<dyn PeerPool>, config: Config) -> Self {
        let replies = ReplyHandler::new(pool.subscribe());
        let registry = PeerRegistry::new(pool.clone());
        let dispatcher = RequestDispatcher::new(pool, config.max_state_fetch);
        Self {
            scheduler: SyncScheduler::new(root, store, config.subtrie_depth),
            dispatcher,
            registry,
            replies,
            sweeper: TimeoutSweeper::new(config.reply_timeout),
            reporter: ProgressReporter::new(config.report_interval),
            next_sweep_at: Instant::now() + config.reply_timeout,
            config,
        }
    }

    /// Runs until the scheduler reports no pending work and every commit has
    /// propagated to the root, or until `cancel` fires. On cancellation the
    /// store retains whatever was already committed; nothing is rolled back,
    /// and nothing partially written is left inconsistent, since every
    /// commit is a single, already-complete `NodeStore::put`.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), SyncError> {
        while self.scheduler.has_pending() {
            if cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }
            tokio::task::yield_now().await;
            self.maybe_sweep().await?;

            let batch = self.scheduler.next_batch(self.config.max_state_fetch);
            if batch.is_empty() {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(SyncError::Cancelled),
                    _ = tokio::time::sleep(self.config.scheduler_idle_backoff) => {}
                    result = self.replies.recv_or_wait(&mut self.scheduler, &mut self.dispatcher, &mut self.registry) => {
                        result?;
                    }
                }
                self.reporter.maybe_report(&self.scheduler, &self.dispatcher);
                continue;
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(SyncError::Cancelled),
                result = self.dispatcher.request(batch, &mut self.registry, self.config.scheduler_idle_backoff) => {
                    // Peer disconnection is not fatal: the hashes stay
                    // in-flight and the sweeper will re-dispatch them to a
                    // different peer once the timeout elapses.
                    result.ok();
                }
            }

            self.replies.drain(&mut self.scheduler, &mut self.dispatcher, &mut self.registry).await?;
            self.reporter.maybe_report(&self.scheduler, &self.dispatcher);
        }

        info!(committed = self.scheduler.committed_count(), "state sync complete");
        Ok(())
    }

    async fn maybe_sweep(&mut self) -> Result<(), SyncError> {
        if Instant::now() < self.next_sweep_at {
            return Ok(());
        }
        let wait = self
            .sweeper
            .sweep(&mut self.dispatcher, &mut self.registry)
            .await
            .unwrap_or(self.config.reply_timeout);
        self.next_sweep_at = Instant::now() + wait;
        Ok(())
    }

    pub fn committed_count(&self) -> u64 {
        self.scheduler.committed_count()
    }
}
