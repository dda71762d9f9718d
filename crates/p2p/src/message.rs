/// A message received from a peer. Anything other than `NodeData` is
/// ignored by the reply handler (with a debug log) since nothing else is
/// relevant to state sync.
#[derive(Debug, Clone)]
pub enum Command {
    /// Node blobs in arbitrary order, possibly a subset of what was asked
    /// for — peers are free to omit hashes they don't have.
    NodeData(Vec<Vec<u8>>),
    /// Placeholder for any other wire message this peer set might deliver
    /// (block announcements, transactions, ...). The sync process never
    /// needs the payload, only the fact that it wasn't `NodeData`.
    Other(&'static str),
}
