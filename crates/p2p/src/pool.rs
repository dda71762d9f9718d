use async_trait::async_trait;
use statesync_common::H256;
use tokio::sync::mpsc;

use crate::message::Command;
use crate::peer::{PeerError, PeerId};

/// The peer protocol surface the sync process consumes. Message framing,
/// the RLPx handshake, and transport encryption all live below this trait —
/// it is the external collaborator named in the spec's peer protocol
/// section, not something this workspace implements.
#[async_trait]
pub trait PeerPool: Send + Sync {
    /// Currently connected peers, in no particular order.
    fn peer_ids(&self) -> Vec<PeerId>;

    /// Sends a `GetNodeData` request for up to `MAX_STATE_FETCH` hashes to
    /// one specific peer. Errors only on disconnection; a slow or
    /// non-responding peer is not an error here, it is a timeout the
    /// sweeper will notice.
    async fn send_get_node_data(&self, peer: PeerId, hashes: Vec<H256>) -> Result<(), PeerError>;

    /// A scoped subscription giving an inbound message queue. Spec leaves
    /// this single-consumer; implementations may panic or error if called
    /// more than once.
    fn subscribe(&self) -> mpsc::Receiver<(PeerId, Command)>;
}
