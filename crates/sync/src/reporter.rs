//! Logs aggregate progress at a fixed interval. Purely observational: it
//! never touches scheduler state, only reads counters.

use std::time::{Duration, Instant};

use tracing::info;

use crate::dispatcher::RequestDispatcher;
use crate::metrics::METRICS;
use crate::scheduler::SyncScheduler;

pub struct ProgressReporter {
    interval: Duration,
    last_report: Instant,
    started_at: Instant,
}

impl ProgressReporter {
    pub fn new(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            interval,
            last_report: now,
            started_at: now,
        }
    }

    /// Logs a line if `interval` has elapsed since the last one; a no-op
    /// otherwise. Called from the main loop's idle path so reporting never
    /// competes with dispatch for attention.
    pub fn maybe_report(&mut self, scheduler: &SyncScheduler, dispatcher: &RequestDispatcher) {
        let now = Instant::now();
        if now.duration_since(self.last_report) < self.interval {
            return;
        }
        self.last_report = now;

        let processed = METRICS.nodes_processed.get();
        let elapsed = now.duration_since(self.started_at).as_secs_f64().max(f64::EPSILON);
        info!(
            nodes_processed = processed,
            nodes_per_sec = processed as f64 / elapsed,
            nodes_committed = scheduler.committed_count(),
            in_flight = dispatcher.in_flight_count(),
            queued = scheduler.queued_count(),
            timeouts = METRICS.timeouts.get(),
            "state sync progress",
        );
    }
}
