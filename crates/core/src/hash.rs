//! Content addressing: every transaction and block is named by the Blake3
//! digest of its contents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 256-bit Blake3 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

/// Identifier of a transaction: the digest of its contents.
pub type TxId = Hash;

/// Identifier of a block: the digest of its back-link and transaction ids.
pub type BlockId = Hash;

/// Placeholder used as `prev_hash` of the first block and as the tip of an empty chain.
pub const GENESIS_PREV: BlockId = Hash::ZERO;

impl Hash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First four hex characters, used in `Tx-xxxx` and `Block-xxxx` forms.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..2])
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash(0x{})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

/// Digest of a single byte string.
pub fn hash(data: &[u8]) -> Hash {
    Hash(blake3::hash(data).into())
}

/// Digest of the concatenation of `parts`, without building the joined buffer.
pub fn hash_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    Hash(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_content_derived() {
        assert_eq!(hash(b"coin"), hash(b"coin"));
        assert_ne!(hash(b"coin"), hash(b"coins"));
    }

    #[test]
    fn test_concat_matches_joined_input() {
        assert_eq!(hash_concat(&[b"prev", b"tx01", b"tx02"]), hash(b"prevtx01tx02"));
        assert_eq!(hash_concat(&[]), hash(b""));
    }

    #[test]
    fn test_display_forms() {
        let h = hash(b"block");
        let display = h.to_string();
        assert_eq!(display.len(), 66);
        assert_eq!(&display[2..], h.to_hex());
        assert_eq!(h.short().len(), 4);
        assert!(h.to_hex().starts_with(&h.short()));
    }

    #[test]
    fn test_genesis_sentinel_is_zero() {
        assert_eq!(GENESIS_PREV, Hash::ZERO);
        assert_eq!(GENESIS_PREV, Hash::default());
        assert_eq!(GENESIS_PREV.to_hex(), "0".repeat(64));
    }
}
