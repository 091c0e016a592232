//! Read access to committed blocks, as used by reconciling clients.

use crate::ledger::{Ledger, Result};
use minibank_core::{Block, BlockId, Transaction, TxId, GENESIS_PREV};
use std::sync::Arc;

/// Something a wallet can pull committed blocks from.
pub trait BlockSource {
    /// Id of the newest committed block, or the genesis sentinel.
    fn latest_hash(&self) -> BlockId;

    /// A committed block by id.
    fn block(&self, id: &BlockId) -> Result<Arc<Block>>;

    /// Find a committed transaction by id, searching the chain only.
    ///
    /// The default walks backward from the tip; sources with an index
    /// should override it.
    fn find_committed(&self, id: &TxId) -> Result<Option<Transaction>> {
        let mut current = self.latest_hash();
        while current != GENESIS_PREV {
            let block = self.block(&current)?;
            if let Some(tx) = block.transactions().iter().find(|tx| tx.id() == *id) {
                return Ok(Some(tx.clone()));
            }
            current = block.prev_hash();
        }
        Ok(None)
    }
}

impl BlockSource for Ledger {
    fn latest_hash(&self) -> BlockId {
        self.get_latest_hash()
    }

    fn block(&self, id: &BlockId) -> Result<Arc<Block>> {
        self.get_block(id)
    }

    fn find_committed(&self, id: &TxId) -> Result<Option<Transaction>> {
        Ok(self.committed_transaction(id).cloned())
    }
}
