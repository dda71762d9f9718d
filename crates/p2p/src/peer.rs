use std::fmt;

use thiserror::Error;

/// Identifies a connected peer. Transport-layer identity (public key,
/// socket address, ...) is the concern of the peer pool implementation;
/// the sync process only ever needs a stable, comparable handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer#{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("peer {0} disconnected")]
    Disconnected(PeerId),
}
