//! A minimal RLP decoder.
//!
//! The state synchronizer only ever needs to pull apart trie nodes and
//! accounts, both of which are shallow, small structures, so this crate
//! implements just enough of the RLP spec to do that: decoding byte
//! strings and lists, with no encoder (nothing in this workspace ever
//! produces RLP, it only consumes it).
//!
//! See <https://ethereum.org/en/developers/docs/data-structures-and-encoding/rlp/>.

pub mod error;

use error::RLPDecodeError;

/// Items larger than this are rejected outright: no well-formed trie node or
/// account record should ever approach this size, so anything claiming to be
/// this large is either a bug or a malicious peer.
const MAX_RLP_BYTES: usize = 32 * 1024 * 1024;

const RLP_NULL: u8 = 0x80;
const RLP_EMPTY_LIST: u8 = 0xc0;

/// A decoded RLP item: either a byte string or a list of items.
///
/// This is a structural, allocation-backed tree rather than a zero-copy
/// view; trie nodes are small enough that the extra copies are immaterial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rlp {
    String(Vec<u8>),
    List(Vec<Rlp>),
}

impl Rlp {
    pub fn as_bytes(&self) -> Result<&[u8], RLPDecodeError> {
        match self {
            Rlp::String(b) => Ok(b),
            Rlp::List(_) => Err(RLPDecodeError::ExpectedString),
        }
    }

    pub fn into_list(self) -> Result<Vec<Rlp>, RLPDecodeError> {
        match self {
            Rlp::List(items) => Ok(items),
            Rlp::String(_) => Err(RLPDecodeError::ExpectedList),
        }
    }
}

/// Decodes a single RLP item from the front of `data`, returning it along
/// with whatever bytes follow it.
pub fn decode_unfinished(data: &[u8]) -> Result<(Rlp, &[u8]), RLPDecodeError> {
    let first = *data.first().ok_or(RLPDecodeError::InvalidLength)?;
    match first {
        0x00..=0x7f => Ok((Rlp::String(vec![first]), &data[1..])),
        0x80..=0xb7 => {
            let len = (first - RLP_NULL) as usize;
            let (payload, rest) = split_at_checked(&data[1..], len)?;
            Ok((Rlp::String(payload.to_vec()), rest))
        }
        0xb8..=0xbf => {
            let len_of_len = (first - 0xb7) as usize;
            let (len_bytes, rest) = split_at_checked(&data[1..], len_of_len)?;
            let len = be_bytes_to_usize(len_bytes)?;
            let (payload, rest) = split_at_checked(rest, len)?;
            Ok((Rlp::String(payload.to_vec()), rest))
        }
        0xc0..=0xf7 => {
            let len = (first - RLP_EMPTY_LIST) as usize;
            let (mut payload, rest) = split_at_checked(&data[1..], len)?;
            let mut items = Vec::new();
            while !payload.is_empty() {
                let (item, remaining) = decode_unfinished(payload)?;
                items.push(item);
                payload = remaining;
            }
            Ok((Rlp::List(items), rest))
        }
        0xf8..=0xff => {
            let len_of_len = (first - 0xf7) as usize;
            let (len_bytes, rest) = split_at_checked(&data[1..], len_of_len)?;
            let len = be_bytes_to_usize(len_bytes)?;
            let (mut payload, rest) = split_at_checked(rest, len)?;
            let mut items = Vec::new();
            while !payload.is_empty() {
                let (item, remaining) = decode_unfinished(payload)?;
                items.push(item);
                payload = remaining;
            }
            Ok((Rlp::List(items), rest))
        }
    }
}

/// Decodes `data` as a single, complete RLP item; trailing bytes are an error.
pub fn decode(data: &[u8]) -> Result<Rlp, RLPDecodeError> {
    let (item, rest) = decode_unfinished(data)?;
    if !rest.is_empty() {
        return Err(RLPDecodeError::InvalidPayloadLength);
    }
    Ok(item)
}

fn split_at_checked(data: &[u8], len: usize) -> Result<(&[u8], &[u8]), RLPDecodeError> {
    if len > MAX_RLP_BYTES {
        return Err(RLPDecodeError::TooLarge);
    }
    if data.len() < len {
        return Err(RLPDecodeError::InvalidLength);
    }
    Ok(data.split_at(len))
}

fn be_bytes_to_usize(bytes: &[u8]) -> Result<usize, RLPDecodeError> {
    if bytes.is_empty() || bytes.len() > size_of::<usize>() {
        return Err(RLPDecodeError::MalformedLength);
    }
    let mut buf = [0u8; size_of::<usize>()];
    buf[size_of::<usize>() - bytes.len()..].copy_from_slice(bytes);
    Ok(usize::from_be_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn decodes_empty_string() {
        assert_eq!(decode(&[0x80]).unwrap(), Rlp::String(vec![]));
    }

    #[test]
    fn decodes_single_byte() {
        assert_eq!(decode(&[0x61]).unwrap(), Rlp::String(vec![0x61]));
    }

    #[test]
    fn decodes_short_string() {
        let data = hex!("83646f67"); // "dog"
        assert_eq!(decode(&data).unwrap(), Rlp::String(b"dog".to_vec()));
    }

    #[test]
    fn decodes_list_of_strings() {
        let data = hex!("c88363617483646f67"); // ["cat", "dog"]
        let decoded = decode(&data).unwrap();
        assert_eq!(
            decoded,
            Rlp::List(vec![
                Rlp::String(b"cat".to_vec()),
                Rlp::String(b"dog".to_vec())
            ])
        );
    }

    #[test]
    fn decodes_empty_list() {
        assert_eq!(decode(&[0xc0]).unwrap(), Rlp::List(vec![]));
    }

    #[test]
    fn rejects_trailing_bytes() {
        assert!(decode(&[0x80, 0x80]).is_err());
    }

    #[test]
    fn rejects_truncated_string() {
        assert!(decode(&[0x83, 0x61, 0x62]).is_err());
    }
}
