//! The trie node decoder: a pure function from a node's raw bytes to its
//! structural shape (branch / extension / leaf), with references to
//! children that are either embedded inline or point at another hash.
//!
//! This crate has no notion of fetching, verifying, or storing anything —
//! it only knows how to take bytes that have already been hash-verified
//! and pull them apart.

pub mod error;
pub mod nibbles;

pub use error::TrieError;
pub use nibbles::Nibbles;
use statesync_common::H256;
use statesync_rlp::Rlp;

/// A reference to a child of a branch or extension node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildRef {
    /// The child is small enough (< 32 bytes encoded) to be embedded
    /// directly in the parent's own encoding; no separate fetch is needed.
    Embedded(Box<Node>),
    /// The child lives elsewhere in the store, keyed by this hash.
    Hash(H256),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchNode {
    pub children: [Option<ChildRef>; 16],
    pub value: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionNode {
    pub prefix: Nibbles,
    pub child: ChildRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    pub path: Nibbles,
    pub value: Vec<u8>,
}

/// The decoded shape of a node. Mirrors the three structural node kinds in
/// a hexary Patricia trie; contract bytecode never reaches this type since
/// raw nodes skip structural decoding entirely (see `SyncRequest::is_raw`
/// in the sync scheduler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Branch(BranchNode),
    Extension(ExtensionNode),
    Leaf(LeafNode),
}

impl Node {
    /// Every hash-referenced (non-embedded) child of this node, in no
    /// particular order. Embedded children are returned too, nested one
    /// level, so callers can recurse without re-walking the RLP.
    pub fn children(&self) -> Vec<&ChildRef> {
        match self {
            Node::Branch(b) => b.children.iter().flatten().collect(),
            Node::Extension(e) => vec![&e.child],
            Node::Leaf(_) => vec![],
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }
}

/// Decodes a node's raw, already hash-verified bytes into its structural
/// shape. This is the `TrieDecoder` contract the sync scheduler depends on.
pub fn decode(bytes: &[u8]) -> Result<Node, TrieError> {
    let rlp = statesync_rlp::decode(bytes)?;
    decode_node_from_rlp(rlp)
}

fn decode_branch(items: Vec<Rlp>) -> Result<Node, TrieError> {
    let mut items = items.into_iter();
    let mut children: [Option<ChildRef>; 16] = Default::default();
    for slot in children.iter_mut() {
        let item = items.next().expect("17-item list has 16 child slots");
        *slot = decode_child(item)?;
    }
    let value_item = items.next().expect("17-item list has a value slot");
    let value_bytes = value_item.as_bytes().map_err(TrieError::from)?;
    let value = if value_bytes.is_empty() {
        None
    } else {
        Some(value_bytes.to_vec())
    };
    Ok(Node::Branch(BranchNode { children, value }))
}

fn decode_leaf_or_extension(items: Vec<Rlp>) -> Result<Node, TrieError> {
    let mut items = items.into_iter();
    let encoded_path = items.next().expect("2-item list has a path").as_bytes().map_err(TrieError::from)?.to_vec();
    let second = items.next().expect("2-item list has a second item");
    let (path, is_leaf) = Nibbles::from_compact(&encoded_path);
    if is_leaf {
        let value = second.as_bytes().map_err(TrieError::from)?.to_vec();
        Ok(Node::Leaf(LeafNode { path, value }))
    } else {
        let child = decode_child(second)?.ok_or(TrieError::InvalidBranchValue)?;
        Ok(Node::Extension(ExtensionNode { prefix: path, child }))
    }
}

fn decode_child(item: Rlp) -> Result<Option<ChildRef>, TrieError> {
    match item {
        Rlp::String(bytes) if bytes.is_empty() => Ok(None),
        Rlp::String(bytes) if bytes.len() == 32 => Ok(Some(ChildRef::Hash(H256::from_slice(&bytes)))),
        // An encoding under 32 bytes is embedded directly rather than
        // hashed-and-referenced; decode it in place.
        Rlp::String(bytes) => Ok(Some(ChildRef::Embedded(Box::new(decode_node_from_rlp(
            statesync_rlp::decode(&bytes).map_err(TrieError::from)?,
        )?)))),
        list @ Rlp::List(_) => Ok(Some(ChildRef::Embedded(Box::new(decode_node_from_rlp(list)?)))),
    }
}

fn decode_node_from_rlp(rlp: Rlp) -> Result<Node, TrieError> {
    let items = rlp.into_list().map_err(TrieError::from)?;
    match items.len() {
        17 => decode_branch(items),
        2 => decode_leaf_or_extension(items),
        n => Err(TrieError::InvalidItemCount(n)),
    }
}
