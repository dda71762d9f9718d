//! Process-wide counters exposed for `ProgressReporter` and, if the
//! embedding binary wires up an HTTP exporter, for scraping. Mirrors the
//! teacher workspace's `LazyLock<Metrics>` singleton rather than threading a
//! metrics handle through every component.

use std::sync::LazyLock;

use prometheus::{IntCounter, IntGauge, Registry};

pub static METRICS: LazyLock<Metrics> = LazyLock::new(Metrics::default);

pub struct Metrics {
    pub registry: Registry,
    pub nodes_processed: IntCounter,
    pub nodes_committed: IntCounter,
    pub bad_nodes: IntCounter,
    pub timeouts: IntCounter,
    pub in_flight: IntGauge,
    pub queued: IntGauge,
}

impl Default for Metrics {
    fn default() -> Self {
        let registry = Registry::new();

        let nodes_processed =
            IntCounter::new("statesync_nodes_processed_total", "node blobs accepted by the scheduler")
                .expect("static metric description is well-formed");
        let nodes_committed =
            IntCounter::new("statesync_nodes_committed_total", "nodes written to the store")
                .expect("static metric description is well-formed");
        let bad_nodes = IntCounter::new("statesync_bad_nodes_total", "replies dropped as malformed or mis-hashed")
            .expect("static metric description is well-formed");
        let timeouts = IntCounter::new("statesync_timeouts_total", "in-flight requests re-dispatched after timeout")
            .expect("static metric description is well-formed");
        let in_flight = IntGauge::new("statesync_in_flight", "hashes currently awaiting a reply")
            .expect("static metric description is well-formed");
        let queued = IntGauge::new("statesync_queued", "hashes known but not yet requested")
            .expect("static metric description is well-formed");

        for metric in [&nodes_processed, &nodes_committed, &bad_nodes, &timeouts] {
            registry
                .register(Box::new(metric.clone()))
                .expect("metric name is registered exactly once");
        }
        for metric in [&in_flight, &queued] {
            registry
                .register(Box::new(metric.clone()))
                .expect("metric name is registered exactly once");
        }

        Self {
            registry,
            nodes_processed,
            nodes_committed,
            bad_nodes,
            timeouts,
            in_flight,
            queued,
        }
    }
}
