//! The bank: owns the chain, the mempool and the UTXO set.
//!
//! Submissions are validated against the current state and queued; ending a
//! period cuts a block from the front of the queue, folds it into the UTXO
//! set and links it onto the chain.

use crate::mempool::Mempool;
use crate::utxo::UtxoSet;
use crate::validator::{TransactionValidator, ValidationError};
use minibank_core::{
    Block, BlockId, MintMarker, PublicKey, Transaction, TxId, GENESIS_PREV,
};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("block not found: {0:?}")]
    NotFound(BlockId),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Ledger configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Block size used by [`Ledger::end_period_default`].
    pub default_block_limit: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_block_limit: 10,
        }
    }
}

/// The centralized bank ledger.
#[derive(Debug, Default)]
pub struct Ledger {
    config: LedgerConfig,
    /// Append-only chain of committed blocks.
    chain: Vec<Arc<Block>>,
    /// Block id -> position in `chain`.
    block_index: HashMap<BlockId, usize>,
    /// Every transaction ever committed, by id.
    history: HashMap<TxId, Transaction>,
    mempool: Mempool,
    utxo: UtxoSet,
}

impl Ledger {
    /// Create a bank with an empty chain and an empty mempool.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn validator(&self) -> TransactionValidator<'_> {
        TransactionValidator {
            mempool: &self.mempool,
            utxo: &self.utxo,
            history: &self.history,
        }
    }

    /// Check `tx` against the admission rules, reporting the first violated one.
    pub fn check_transaction(&self, tx: &Transaction) -> std::result::Result<(), ValidationError> {
        self.validator().validate(tx)
    }

    /// True iff `tx` would currently be accepted.
    pub fn validate(&self, tx: &Transaction) -> bool {
        self.check_transaction(tx).is_ok()
    }

    /// Validate `tx` and queue it on success. A rejected transaction leaves
    /// the ledger untouched.
    pub fn submit_transaction(&mut self, tx: Transaction) -> bool {
        if let Err(reason) = self.check_transaction(&tx) {
            debug!(tx = %tx, %reason, "rejected transaction");
            return false;
        }
        match self.mempool.push(tx) {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, "mempool refused transaction");
                false
            }
        }
    }

    /// Commit up to `limit` pending transactions into a new block and return its id.
    ///
    /// Fails with [`LedgerError::InvalidArgument`] if `limit` is not a
    /// non-negative integer; nothing is changed in that case.
    pub fn end_period<L>(&mut self, limit: L) -> Result<BlockId>
    where
        L: TryInto<usize> + fmt::Display + Copy,
    {
        let limit: usize = limit.try_into().map_err(|_| {
            LedgerError::InvalidArgument(format!("limit must be a non-negative integer, got {limit}"))
        })?;
        Ok(self.commit(limit))
    }

    /// [`Ledger::end_period`] with the configured default block limit.
    pub fn end_period_default(&mut self) -> BlockId {
        self.commit(self.config.default_block_limit)
    }

    fn commit(&mut self, limit: usize) -> BlockId {
        let batch = self.mempool.take_front(limit);
        self.utxo.apply_batch(&batch);
        for tx in &batch {
            self.history.insert(tx.id(), tx.clone());
        }

        let block = Block::new(batch, self.get_latest_hash());
        let id = block.id();
        info!(
            block = %block,
            height = self.chain.len() + 1,
            pending = self.mempool.len(),
            "committed block"
        );
        self.block_index.insert(id, self.chain.len());
        self.chain.push(Arc::new(block));
        id
    }

    /// Look up a committed block by id.
    pub fn get_block(&self, id: &BlockId) -> Result<Arc<Block>> {
        self.block_index
            .get(id)
            .map(|&pos| Arc::clone(&self.chain[pos]))
            .ok_or(LedgerError::NotFound(*id))
    }

    /// Id of the last block, or the genesis sentinel for an empty chain.
    pub fn get_latest_hash(&self) -> BlockId {
        self.chain.last().map(|b| b.id()).unwrap_or(GENESIS_PREV)
    }

    /// Pending transactions in commit order.
    pub fn get_mempool(&self) -> Vec<Transaction> {
        self.mempool.to_vec()
    }

    /// Currently unspent transactions.
    pub fn get_utxo(&self) -> HashSet<Transaction> {
        self.utxo.to_set()
    }

    /// Queue a coin for `target` out of thin air, bypassing validation.
    ///
    /// This is the only path that produces coin-creation transactions.
    pub fn mint(&mut self, target: PublicKey) -> TxId {
        let tx = Transaction::creation(target, MintMarker::random());
        let id = tx.id();
        info!(tx = %tx, owner = %tx.output().short(), "minted coin");
        // A fresh random marker cannot collide with a pending id.
        if let Err(err) = self.mempool.push(tx) {
            warn!(tx = %id.short(), error = %err, "minted coin not queued");
            debug_assert!(false, "mint collided with a pending transaction");
        }
        id
    }

    /// Number of committed blocks.
    pub fn height(&self) -> usize {
        self.chain.len()
    }

    /// Committed blocks, oldest first.
    pub fn blocks(&self) -> impl Iterator<Item = &Arc<Block>> {
        self.chain.iter()
    }

    /// A committed transaction by id.
    pub fn committed_transaction(&self, id: &TxId) -> Option<&Transaction> {
        self.history.get(id)
    }

    /// A pending or committed transaction by id.
    pub fn find_transaction(&self, id: &TxId) -> Option<&Transaction> {
        self.validator().find_predecessor(id)
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            height: self.height(),
            tip: self.get_latest_hash(),
            pending_transactions: self.mempool.len(),
            unspent_outputs: self.utxo.len(),
            committed_transactions: self.history.len(),
        }
    }
}

impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bank;size={}", self.chain.len())
    }
}

/// Ledger statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerStats {
    /// Number of committed blocks.
    pub height: usize,
    /// Id of the latest block.
    pub tip: BlockId,
    /// Number of pending transactions.
    pub pending_transactions: usize,
    /// Size of the UTXO set.
    pub unspent_outputs: usize,
    /// Transactions committed across all blocks.
    pub committed_transactions: usize,
}
