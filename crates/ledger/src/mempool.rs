//! Transaction mempool for pending transactions.
//!
//! The mempool stores validated transactions waiting to be committed, in
//! submission order. Blocks are cut from its front.

use minibank_core::{Transaction, TxId};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

/// Errors that can occur during mempool operations.
#[derive(Debug, Error)]
pub enum MempoolError {
    #[error("transaction already in mempool")]
    DuplicateTransaction,
}

pub type Result<T> = std::result::Result<T, MempoolError>;

/// Transaction mempool.
#[derive(Debug, Default)]
pub struct Mempool {
    /// Transaction ids in FIFO order.
    queue: VecDeque<TxId>,
    /// Transactions indexed by id.
    transactions: HashMap<TxId, Transaction>,
    /// Consumed input -> id of the pending transaction spending it.
    by_input: HashMap<TxId, TxId>,
}

impl Mempool {
    /// Create an empty mempool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of transactions in the mempool.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if the mempool is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Check if a transaction is in the mempool.
    pub fn contains(&self, id: &TxId) -> bool {
        self.transactions.contains_key(id)
    }

    /// Get a transaction from the mempool.
    pub fn get(&self, id: &TxId) -> Option<&Transaction> {
        self.transactions.get(id)
    }

    /// Id of the pending transaction that already spends `input`, if any.
    pub fn spender_of(&self, input: &TxId) -> Option<&TxId> {
        self.by_input.get(input)
    }

    /// Append a transaction to the tail of the queue.
    pub fn push(&mut self, tx: Transaction) -> Result<()> {
        let id = tx.id();
        if self.contains(&id) {
            return Err(MempoolError::DuplicateTransaction);
        }

        // First spender of an input stays indexed.
        if let Some(input) = tx.input() {
            self.by_input.entry(*input).or_insert(id);
        }
        self.queue.push_back(id);
        self.transactions.insert(id, tx);
        Ok(())
    }

    /// Remove and return up to `limit` transactions from the front, in order.
    pub fn take_front(&mut self, limit: usize) -> Vec<Transaction> {
        let count = limit.min(self.queue.len());
        let mut batch = Vec::with_capacity(count);
        for id in self.queue.drain(..count) {
            if let Some(tx) = self.transactions.remove(&id) {
                if let Some(input) = tx.input() {
                    if self.by_input.get(input) == Some(&id) {
                        self.by_input.remove(input);
                    }
                }
                batch.push(tx);
            }
        }
        batch
    }

    /// Iterate pending transactions in FIFO order.
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.queue.iter().filter_map(|id| self.transactions.get(id))
    }

    /// Copy of the pending transactions in FIFO order.
    pub fn to_vec(&self) -> Vec<Transaction> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minibank_core::{hash, Keypair, MintMarker};

    fn transfer(owner: &Keypair, input: &[u8]) -> Transaction {
        Transaction::signed_transfer(owner, hash(input), Keypair::generate().public_key)
    }

    #[test]
    fn test_mempool_push_and_get() {
        let mut mempool = Mempool::new();
        let kp = Keypair::generate();
        let tx = transfer(&kp, b"coin");

        assert!(mempool.push(tx.clone()).is_ok());
        assert_eq!(mempool.len(), 1);
        assert!(mempool.contains(&tx.id()));
        assert_eq!(mempool.get(&tx.id()).unwrap(), &tx);
        assert_eq!(mempool.spender_of(&hash(b"coin")), Some(&tx.id()));
    }

    #[test]
    fn test_mempool_duplicate_rejected() {
        let mut mempool = Mempool::new();
        let tx = transfer(&Keypair::generate(), b"coin");

        mempool.push(tx.clone()).unwrap();
        assert!(matches!(
            mempool.push(tx),
            Err(MempoolError::DuplicateTransaction)
        ));
        assert_eq!(mempool.len(), 1);
    }

    #[test]
    fn test_take_front_is_fifo() {
        let mut mempool = Mempool::new();
        let kp = Keypair::generate();
        let txs: Vec<_> = [b"a", b"b", b"c"].iter().map(|i| transfer(&kp, *i)).collect();
        for tx in &txs {
            mempool.push(tx.clone()).unwrap();
        }

        let batch = mempool.take_front(2);
        assert_eq!(batch, txs[..2].to_vec());
        assert_eq!(mempool.to_vec(), txs[2..].to_vec());
        assert!(mempool.spender_of(&hash(b"a")).is_none());
        assert!(mempool.spender_of(&hash(b"c")).is_some());
    }

    #[test]
    fn test_take_front_larger_than_pool() {
        let mut mempool = Mempool::new();
        let kp = Keypair::generate();
        mempool
            .push(Transaction::creation(kp.public_key, MintMarker::random()))
            .unwrap();

        assert_eq!(mempool.take_front(10).len(), 1);
        assert!(mempool.is_empty());
        assert!(mempool.take_front(10).is_empty());
    }

    #[test]
    fn test_take_front_zero_keeps_order() {
        let mut mempool = Mempool::new();
        let kp = Keypair::generate();
        let txs: Vec<_> = [b"x", b"y"].iter().map(|i| transfer(&kp, *i)).collect();
        for tx in &txs {
            mempool.push(tx.clone()).unwrap();
        }

        assert!(mempool.take_front(0).is_empty());
        assert_eq!(mempool.to_vec(), txs);
    }
}
