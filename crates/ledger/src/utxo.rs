//! The set of transactions whose coin is currently unspent.

use minibank_core::{Transaction, TxId};
use std::collections::{HashMap, HashSet};

/// Unspent transaction outputs, keyed by transaction id.
#[derive(Debug, Default, Clone)]
pub struct UtxoSet {
    coins: HashMap<TxId, Transaction>,
}

impl UtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn contains(&self, id: &TxId) -> bool {
        self.coins.contains_key(id)
    }

    pub fn get(&self, id: &TxId) -> Option<&Transaction> {
        self.coins.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.coins.values()
    }

    /// Fold a committed batch into the set.
    ///
    /// Result is `(self ∪ batch) \ {t : t.id consumed by some tx in batch}`,
    /// so a coin created and spent inside the same batch never appears.
    pub fn apply_batch(&mut self, batch: &[Transaction]) {
        let consumed: HashSet<TxId> = batch.iter().filter_map(|tx| tx.input().copied()).collect();

        for tx in batch {
            self.coins.insert(tx.id(), tx.clone());
        }
        self.coins.retain(|id, _| !consumed.contains(id));
    }

    /// Copy of the set, keyed by transaction equality.
    pub fn to_set(&self) -> HashSet<Transaction> {
        self.coins.values().cloned().collect()
    }
}
