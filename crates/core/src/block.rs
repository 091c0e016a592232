//! Hash-linked blocks of committed transactions.

use crate::hash::{hash_concat, BlockId, GENESIS_PREV};
use crate::transaction::Transaction;
use serde::Serialize;
use std::fmt;

/// An ordered batch of transactions plus a back-link to the previous block.
///
/// The id commits to `prev_hash` and to every transaction id in order, so
/// reordering the same transactions yields a different block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    transactions: Vec<Transaction>,
    prev_hash: BlockId,
    id: BlockId,
}

impl Block {
    /// Create a block over `transactions`, linked to `prev_hash`.
    pub fn new(transactions: Vec<Transaction>, prev_hash: BlockId) -> Self {
        let id = Self::compute_id(&prev_hash, &transactions);
        Self {
            transactions,
            prev_hash,
            id,
        }
    }

    /// Digest of `prev_hash ++ tx1.id ++ tx2.id ++ ...`.
    pub fn compute_id(prev_hash: &BlockId, transactions: &[Transaction]) -> BlockId {
        let tx_ids: Vec<_> = transactions.iter().map(|tx| tx.id()).collect();
        let mut parts: Vec<&[u8]> = Vec::with_capacity(tx_ids.len() + 1);
        parts.push(prev_hash.as_bytes());
        parts.extend(tx_ids.iter().map(|id| id.as_bytes() as &[u8]));
        hash_concat(&parts)
    }

    /// Get the block hash.
    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn prev_hash(&self) -> BlockId {
        self.prev_hash
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Get the number of transactions in this block.
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// True for the block that opens the chain.
    pub fn is_first(&self) -> bool {
        self.prev_hash == GENESIS_PREV
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block-{};size={}", self.id.short(), self.tx_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::hash::hash;
    use crate::transaction::MintMarker;

    fn minted(n: usize) -> Vec<Transaction> {
        let kp = Keypair::generate();
        (0..n)
            .map(|_| Transaction::creation(kp.public_key.clone(), MintMarker::random()))
            .collect()
    }

    #[test]
    fn test_prev_hash_preserved() {
        let prev = hash(b"previous");
        let block = Block::new(minted(2), prev);
        assert_eq!(block.prev_hash(), prev);
        assert_eq!(block.tx_count(), 2);
        assert!(!block.is_first());
    }

    #[test]
    fn test_block_id_deterministic() {
        let txs = minted(3);
        let b1 = Block::new(txs.clone(), GENESIS_PREV);
        let b2 = Block::new(txs, GENESIS_PREV);
        assert_eq!(b1.id(), b2.id());
    }

    #[test]
    fn test_block_id_matches_digest_layout() {
        let txs = minted(2);
        let block = Block::new(txs.clone(), GENESIS_PREV);
        let expected = hash_concat(&[
            GENESIS_PREV.as_bytes(),
            txs[0].id().as_bytes(),
            txs[1].id().as_bytes(),
        ]);
        assert_eq!(block.id(), expected);
    }

    #[test]
    fn test_reordering_changes_id() {
        let txs = minted(2);
        let mut reversed = txs.clone();
        reversed.reverse();

        let b1 = Block::new(txs, GENESIS_PREV);
        let b2 = Block::new(reversed, GENESIS_PREV);
        assert_ne!(b1.id(), b2.id());
    }

    #[test]
    fn test_prev_hash_changes_id() {
        let txs = minted(1);
        let b1 = Block::new(txs.clone(), GENESIS_PREV);
        let b2 = Block::new(txs, hash(b"other"));
        assert_ne!(b1.id(), b2.id());
    }

    #[test]
    fn test_empty_block() {
        let block = Block::new(vec![], GENESIS_PREV);
        assert!(block.is_empty());
        assert!(block.is_first());
        assert_eq!(block.id(), hash(GENESIS_PREV.as_bytes()));
        assert!(block.to_string().ends_with(";size=0"));
    }
}
