//! Peer protocol contracts consumed by the state synchronizer.
//!
//! Everything in this crate is an external collaborator: message framing,
//! the RLPx handshake, and transport encryption are out of scope for the
//! synchronizer and are assumed to already be running underneath whatever
//! implements [`pool::PeerPool`]. The `test-utils` feature adds an
//! in-memory mock used by the sync crate's integration tests.

pub mod message;
pub mod peer;
pub mod pool;

#[cfg(feature = "test-utils")]
pub mod mock;

pub use message::Command;
pub use peer::{PeerError, PeerId};
pub use pool::PeerPool;
