//! Tunable constants for the sync process, overridable via environment
//! variables the same way the teacher workspace overrides its batch sizes
//! for its `sync-test` feature — here it's unconditional since this crate
//! has no equivalent feature flag to gate it behind.

use std::time::Duration;

/// Protocol-defined cap on hashes per `GetNodeData` batch.
pub const MAX_STATE_FETCH_DEFAULT: usize = 384;
/// How long we wait for a reply before re-queuing a hash.
pub const REPLY_TIMEOUT_DEFAULT: Duration = Duration::from_secs(20);
/// Interval between progress log lines.
pub const REPORT_INTERVAL_DEFAULT: Duration = Duration::from_secs(10);
/// Sleep when the scheduler has no batch ready (all pending work in flight).
pub const SCHEDULER_IDLE_BACKOFF_DEFAULT: Duration = Duration::from_millis(500);
/// The depth assigned to storage-root and code-hash requests scheduled
/// from an account leaf, chosen to rank below any unvisited account-trie
/// request (whose depth is at most 64 nibbles). Only the relative
/// ordering matters, not the absolute value.
pub const SUBTRIE_DEPTH_DEFAULT: u32 = 64;

#[derive(Debug, Clone)]
pub struct Config {
    pub max_state_fetch: usize,
    pub reply_timeout: Duration,
    pub report_interval: Duration,
    pub scheduler_idle_backoff: Duration,
    pub subtrie_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_state_fetch: MAX_STATE_FETCH_DEFAULT,
            reply_timeout: REPLY_TIMEOUT_DEFAULT,
            report_interval: REPORT_INTERVAL_DEFAULT,
            scheduler_idle_backoff: SCHEDULER_IDLE_BACKOFF_DEFAULT,
            subtrie_depth: SUBTRIE_DEPTH_DEFAULT,
        }
    }
}

impl Config {
    /// Reads overrides from the environment, falling back to the spec's
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env_u64("STATESYNC_MAX_STATE_FETCH") {
            config.max_state_fetch = v as usize;
        }
        if let Some(v) = env_u64("STATESYNC_REPLY_TIMEOUT_SECS") {
            config.reply_timeout = Duration::from_secs(v);
        }
        if let Some(v) = env_u64("STATESYNC_REPORT_INTERVAL_SECS") {
            config.report_interval = Duration::from_secs(v);
        }
        if let Some(v) = env_u64("STATESYNC_IDLE_BACKOFF_MS") {
            config.scheduler_idle_backoff = Duration::from_millis(v);
        }
        config
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
