//! Thread-safe handle to a ledger.
//!
//! Mutations (`submit_transaction`, `end_period`, `mint`) take the write lock,
//! so they are serialized with each other. Blocks are immutable once appended,
//! so readers walking the chain from a captured tip never observe a partial
//! commit.

use crate::ledger::{Ledger, LedgerConfig, LedgerStats, Result};
use crate::source::BlockSource;
use crate::validator::ValidationError;
use minibank_core::{Block, BlockId, PublicKey, Transaction, TxId};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Cloneable, shared ledger with single-writer discipline.
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        Self::from(Ledger::with_config(config))
    }

    /// Run `f` with read access to the ledger.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.inner.read())
    }

    pub fn submit_transaction(&self, tx: Transaction) -> bool {
        self.inner.write().submit_transaction(tx)
    }

    pub fn check_transaction(&self, tx: &Transaction) -> std::result::Result<(), ValidationError> {
        self.inner.read().check_transaction(tx)
    }

    pub fn validate(&self, tx: &Transaction) -> bool {
        self.inner.read().validate(tx)
    }

    pub fn end_period<L>(&self, limit: L) -> Result<BlockId>
    where
        L: TryInto<usize> + fmt::Display + Copy,
    {
        self.inner.write().end_period(limit)
    }

    pub fn end_period_default(&self) -> BlockId {
        self.inner.write().end_period_default()
    }

    pub fn mint(&self, target: PublicKey) -> TxId {
        self.inner.write().mint(target)
    }

    pub fn get_block(&self, id: &BlockId) -> Result<Arc<Block>> {
        self.inner.read().get_block(id)
    }

    pub fn get_latest_hash(&self) -> BlockId {
        self.inner.read().get_latest_hash()
    }

    pub fn get_mempool(&self) -> Vec<Transaction> {
        self.inner.read().get_mempool()
    }

    pub fn get_utxo(&self) -> HashSet<Transaction> {
        self.inner.read().get_utxo()
    }

    pub fn stats(&self) -> LedgerStats {
        self.inner.read().stats()
    }
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }
}

impl BlockSource for SharedLedger {
    fn latest_hash(&self) -> BlockId {
        self.get_latest_hash()
    }

    fn block(&self, id: &BlockId) -> Result<Arc<Block>> {
        self.get_block(id)
    }

    fn find_committed(&self, id: &TxId) -> Result<Option<Transaction>> {
        Ok(self.inner.read().committed_transaction(id).cloned())
    }
}
