//! Core ledger primitives for minibank.
//!
//! This crate provides the fundamental types used throughout the bank:
//! - Blake3 content addressing (transaction and block ids)
//! - Ed25519 keys and signatures
//! - Single-coin transactions
//! - Hash-linked blocks

pub mod block;
pub mod crypto;
pub mod hash;
pub mod transaction;

// Re-export commonly used types at the crate root
pub use block::Block;
pub use crypto::{CryptoError, Keypair, PublicKey, Signature};
pub use hash::{hash, hash_concat, BlockId, Hash, TxId, GENESIS_PREV};
pub use transaction::{MintMarker, Transaction, TransactionError, TxKind, MINT_MARKER_LEN};
