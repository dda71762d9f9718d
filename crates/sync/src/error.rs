use statesync_storage::StoreError;
use thiserror::Error;

/// Per-item outcome of [`crate::scheduler::SyncScheduler::process_one`].
/// Both variants are benign: the reply handler logs them and moves on to
/// the next item in the batch, per the spec's error handling design.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("blob does not hash to the requested key, or failed to decode: {0}")]
    BadNode(String),
    #[error("hash is not a currently pending request (duplicate or stale reply)")]
    AlreadyProcessed,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The top-level error surfaced by the sync process. Only [`SyncError::StorePutFailure`]
/// and [`SyncError::Cancelled`] are fatal; everything upstream of those is
/// handled as a retry.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to persist a verified node: {0}")]
    StorePutFailure(#[from] StoreError),
    #[error("sync cancelled")]
    Cancelled,
}
