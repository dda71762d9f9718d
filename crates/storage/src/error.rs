use thiserror::Error;

/// A `put` failure is the one fatal error in the whole sync pipeline: the
/// spec treats it as unrecoverable and aborts the sync rather than silently
/// losing a verified node.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backing store I/O error: {0}")]
    Io(String),
    #[cfg(feature = "redb")]
    #[error("redb error: {0}")]
    Redb(String),
}
