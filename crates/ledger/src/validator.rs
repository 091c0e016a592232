//! Transaction admission rules.
//!
//! Rules run in a fixed order and the first failing rule decides the
//! rejection reason. Validation never mutates ledger state.

use crate::mempool::Mempool;
use crate::utxo::UtxoSet;
use minibank_core::{Transaction, TxId};
use std::collections::HashMap;
use thiserror::Error;

/// Reasons a transaction is refused by the bank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("coin-creation transactions can only be produced by the mint")]
    CreationNotAllowed,

    #[error("input transaction {0} is unknown")]
    UnknownPredecessor(TxId),

    #[error("transaction signature verification failed")]
    InvalidSignature,

    #[error("input transaction {0} is already spent")]
    AlreadySpent(TxId),

    #[error("input already spent by pending transaction {0}")]
    ConflictingTransaction(TxId),

    #[error("transaction {0} is already pending")]
    AlreadyPending(TxId),
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Read-only view over the ledger state a submission is checked against.
pub struct TransactionValidator<'a> {
    pub(crate) mempool: &'a Mempool,
    pub(crate) utxo: &'a UtxoSet,
    pub(crate) history: &'a HashMap<TxId, Transaction>,
}

impl<'a> TransactionValidator<'a> {
    /// Look up a transaction across the mempool, the UTXO set and every committed block.
    pub fn find_predecessor(&self, input: &TxId) -> Option<&'a Transaction> {
        self.mempool
            .get(input)
            .or_else(|| self.utxo.get(input))
            .or_else(|| self.history.get(input))
    }

    /// Run every admission rule against `tx`.
    pub fn validate(&self, tx: &Transaction) -> Result<()> {
        // Only the mint may create coins.
        let input = match tx.input() {
            Some(input) => input,
            None => return Err(ValidationError::CreationNotAllowed),
        };

        let predecessor = self
            .find_predecessor(input)
            .ok_or(ValidationError::UnknownPredecessor(*input))?;

        // The current owner of the coin must have signed input ++ output.
        tx.verify_spend(predecessor.output())
            .map_err(|_| ValidationError::InvalidSignature)?;

        if !self.utxo.contains(input) {
            return Err(ValidationError::AlreadySpent(*input));
        }

        match self.mempool.spender_of(input) {
            Some(pending) if *pending == tx.id() => Err(ValidationError::AlreadyPending(*pending)),
            Some(pending) => Err(ValidationError::ConflictingTransaction(*pending)),
            None => Ok(()),
        }
    }
}
