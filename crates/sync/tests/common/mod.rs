//! Minimal RLP encoding helpers for building trie fixtures in tests. The
//! library itself never encodes RLP (it only consumes already-encoded
//! bytes), so this lives only under `tests/`.

use statesync_common::H256;

pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    if bytes.len() == 1 && bytes[0] < 0x80 {
        return vec![bytes[0]];
    }
    let mut out = length_prefix(0x80, 0xb7, bytes.len());
    out.extend_from_slice(bytes);
    out
}

pub fn encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload: Vec<u8> = items.concat();
    let mut out = length_prefix(0xc0, 0xf7, payload.len());
    out.extend_from_slice(&payload);
    out
}

fn length_prefix(short_base: u8, long_base: u8, len: usize) -> Vec<u8> {
    if len < 56 {
        vec![short_base + len as u8]
    } else {
        let len_bytes = len.to_be_bytes();
        let trimmed: Vec<u8> = len_bytes.iter().copied().skip_while(|b| *b == 0).collect();
        let mut out = vec![long_base + trimmed.len() as u8];
        out.extend_from_slice(&trimmed);
        out
    }
}

/// Hex-prefix ("compact") encodes a nibble path with the leaf/extension flag.
pub fn hex_prefix(nibbles: &[u8], is_leaf: bool) -> Vec<u8> {
    let flag = if is_leaf { 0x20 } else { 0x00 };
    let mut out = Vec::with_capacity(nibbles.len() / 2 + 1);
    if nibbles.len() % 2 == 0 {
        out.push(flag);
        for chunk in nibbles.chunks(2) {
            out.push((chunk[0] << 4) | chunk[1]);
        }
    } else {
        out.push(flag | 0x10 | nibbles[0]);
        for chunk in nibbles[1..].chunks(2) {
            out.push((chunk[0] << 4) | chunk[1]);
        }
    }
    out
}

pub fn leaf_node(path_nibbles: &[u8], value: &[u8]) -> Vec<u8> {
    encode_list(&[encode_bytes(&hex_prefix(path_nibbles, true)), encode_bytes(value)])
}

pub fn extension_node(path_nibbles: &[u8], child_hash: H256) -> Vec<u8> {
    encode_list(&[
        encode_bytes(&hex_prefix(path_nibbles, false)),
        encode_bytes(child_hash.as_bytes()),
    ])
}

/// A branch node with a single hash-referenced child at `slot` and no value.
pub fn branch_with_one_child(slot: usize, child_hash: H256) -> Vec<u8> {
    let mut items = vec![encode_bytes(&[]); 16];
    items[slot] = encode_bytes(child_hash.as_bytes());
    items.push(encode_bytes(&[]));
    encode_list(&items)
}

pub fn account_record(nonce: u64, balance: u64, storage_root: H256, code_hash: H256) -> Vec<u8> {
    encode_list(&[
        encode_bytes(&trim_be(nonce)),
        encode_bytes(&trim_be(balance)),
        encode_bytes(storage_root.as_bytes()),
        encode_bytes(code_hash.as_bytes()),
    ])
}

fn trim_be(n: u64) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let trimmed: Vec<u8> = bytes.iter().copied().skip_while(|b| *b == 0).collect();
    trimmed
}
