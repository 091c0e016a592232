//! A wallet that reconstructs its balance from the bank's chain.
//!
//! The wallet trusts the bank: committed transactions are not re-verified,
//! and spends are only reflected once they appear in a block.

use minibank_core::{Block, BlockId, Keypair, PublicKey, Transaction, GENESIS_PREV};
use minibank_ledger::{BlockSource, LedgerError};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during wallet operations.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

pub type Result<T> = std::result::Result<T, WalletError>;

/// A single-key wallet.
pub struct Wallet {
    keypair: Keypair,
    /// Coins owned according to the blocks seen so far.
    balance: u64,
    /// Reconciliation cursor: id of the last processed block.
    last_seen_hash: BlockId,
    /// Owned coins that can be spent.
    unspent_coins: HashSet<Transaction>,
    /// Owned coins committed to a transfer that is not on chain yet.
    pending_spent_coins: HashSet<Transaction>,
    /// Transfers created here that have not appeared in a block yet.
    pending_own_txs: HashSet<Transaction>,
    income_txs: HashSet<Transaction>,
    outcome_txs: HashSet<Transaction>,
}

impl Wallet {
    /// Create a wallet with a freshly generated key.
    pub fn new() -> Self {
        Self::from_keypair(Keypair::generate())
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            keypair,
            balance: 0,
            last_seen_hash: GENESIS_PREV,
            unspent_coins: HashSet::new(),
            pending_spent_coins: HashSet::new(),
            pending_own_txs: HashSet::new(),
            income_txs: HashSet::new(),
            outcome_txs: HashSet::new(),
        }
    }

    /// Process every block committed since the last update, oldest first.
    ///
    /// Blocks and spent coins are all fetched before anything changes: if any
    /// lookup fails the wallet is left unchanged and the error is returned.
    pub fn update<S: BlockSource + ?Sized>(&mut self, source: &S) -> Result<()> {
        let tip = source.latest_hash();
        let new_blocks = self.blocks_since(source, tip)?;

        // Only committed history is searched here, never the mempool.
        let mut resolved = Vec::new();
        for block in &new_blocks {
            for tx in block.transactions() {
                let predecessor = match tx.input() {
                    Some(input) => source.find_committed(input)?,
                    None => None,
                };
                resolved.push((tx, predecessor));
            }
        }
        for (tx, predecessor) in resolved {
            self.apply(tx, predecessor);
        }

        if !new_blocks.is_empty() {
            debug!(
                wallet = %self.get_address().short(),
                blocks = new_blocks.len(),
                balance = self.balance,
                "wallet updated"
            );
        }
        self.last_seen_hash = tip;
        Ok(())
    }

    fn blocks_since<S: BlockSource + ?Sized>(
        &self,
        source: &S,
        tip: BlockId,
    ) -> Result<Vec<Arc<Block>>> {
        let mut blocks = Vec::new();
        let mut current = tip;
        while current != self.last_seen_hash {
            let block = source.block(&current)?;
            current = block.prev_hash();
            blocks.push(block);
        }
        blocks.reverse();
        Ok(blocks)
    }

    fn apply(&mut self, tx: &Transaction, predecessor: Option<Transaction>) {
        let me = self.keypair.public_key.clone();

        if tx.output() == &me {
            self.balance += 1;
            self.unspent_coins.insert(tx.clone());
            self.income_txs.insert(tx.clone());
            debug!(tx = %tx, "received coin");
        }

        let Some(predecessor) = predecessor else {
            return;
        };
        if predecessor.output() == &me {
            if self.balance == 0 {
                warn!(tx = %tx, "spend observed with zero balance");
            }
            self.balance = self.balance.saturating_sub(1);
            self.outcome_txs.insert(tx.clone());
            self.pending_own_txs.remove(tx);
            self.pending_spent_coins.remove(&predecessor);
            // The coin may be back among the unspent ones if `unfreeze_all`
            // ran while this spend was in flight.
            self.unspent_coins.remove(&predecessor);
            debug!(tx = %tx, coin = %predecessor, "spent coin");
        }
    }

    /// Sign a transfer of one unspent coin to `target`.
    ///
    /// The chosen coin is frozen until [`Wallet::unfreeze_all`] or until the
    /// spend is seen on chain. Returns `None` when nothing is spendable. The
    /// transaction is not submitted.
    pub fn create_transaction(&mut self, target: PublicKey) -> Option<Transaction> {
        if self.balance == 0 {
            return None;
        }
        let coin = self.unspent_coins.iter().next()?.clone();
        self.unspent_coins.remove(&coin);

        let tx = Transaction::signed_transfer(&self.keypair, coin.id(), target);
        self.pending_spent_coins.insert(coin);
        self.pending_own_txs.insert(tx.clone());
        Some(tx)
    }

    /// Make every frozen coin spendable again.
    ///
    /// Pending transfers stay recorded; use this to retry spends whose
    /// transaction was lost or rejected.
    pub fn unfreeze_all(&mut self) {
        self.unspent_coins.extend(self.pending_spent_coins.drain());
    }

    /// Balance as of the last [`Wallet::update`].
    pub fn get_balance(&self) -> u64 {
        self.balance
    }

    pub fn get_address(&self) -> PublicKey {
        self.keypair.public_key.clone()
    }

    pub fn last_seen_hash(&self) -> BlockId {
        self.last_seen_hash
    }

    pub fn unspent_coins(&self) -> &HashSet<Transaction> {
        &self.unspent_coins
    }

    pub fn pending_spent_coins(&self) -> &HashSet<Transaction> {
        &self.pending_spent_coins
    }

    pub fn pending_own_txs(&self) -> &HashSet<Transaction> {
        &self.pending_own_txs
    }

    pub fn income_txs(&self) -> &HashSet<Transaction> {
        &self.income_txs
    }

    pub fn outcome_txs(&self) -> &HashSet<Transaction> {
        &self.outcome_txs
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.keypair.public_key)
            .field("balance", &self.balance)
            .field("last_seen_hash", &self.last_seen_hash)
            .finish()
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wallet-{};Balance={}",
            self.keypair.public_key.short(),
            self.balance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minibank_core::TxId;
    use minibank_ledger::Ledger;

    /// Serves blocks but fails every transaction lookup.
    struct NoHistory<'a>(&'a Ledger);

    impl BlockSource for NoHistory<'_> {
        fn latest_hash(&self) -> BlockId {
            self.0.get_latest_hash()
        }

        fn block(&self, id: &BlockId) -> minibank_ledger::Result<Arc<Block>> {
            self.0.get_block(id)
        }

        fn find_committed(&self, id: &TxId) -> minibank_ledger::Result<Option<Transaction>> {
            Err(LedgerError::NotFound(*id))
        }
    }

    fn funded(ledger: &mut Ledger) -> Wallet {
        let mut wallet = Wallet::new();
        ledger.mint(wallet.get_address());
        ledger.end_period(10).unwrap();
        wallet.update(&*ledger).unwrap();
        wallet
    }

    #[test]
    fn test_new_wallet() {
        let wallet = Wallet::new();
        assert_eq!(wallet.get_balance(), 0);
        assert_eq!(wallet.last_seen_hash(), GENESIS_PREV);
        assert!(wallet.to_string().ends_with(";Balance=0"));
    }

    #[test]
    fn test_mint_credits_wallet() {
        let mut ledger = Ledger::new();
        let wallet = funded(&mut ledger);

        assert_eq!(wallet.get_balance(), 1);
        assert_eq!(wallet.unspent_coins().len(), 1);
        assert_eq!(wallet.income_txs().len(), 1);
        assert_eq!(wallet.last_seen_hash(), ledger.get_latest_hash());
        let coin = wallet.unspent_coins().iter().next().unwrap();
        assert!(ledger.get_utxo().contains(coin));
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut ledger = Ledger::new();
        let mut wallet = funded(&mut ledger);

        wallet.update(&ledger).unwrap();
        wallet.update(&ledger).unwrap();
        assert_eq!(wallet.get_balance(), 1);
        assert_eq!(wallet.income_txs().len(), 1);
    }

    #[test]
    fn test_pending_mint_not_counted() {
        let mut ledger = Ledger::new();
        let mut wallet = Wallet::new();
        ledger.mint(wallet.get_address());

        wallet.update(&ledger).unwrap();
        assert_eq!(wallet.get_balance(), 0);
    }

    #[test]
    fn test_create_transaction_without_funds() {
        let mut wallet = Wallet::new();
        assert!(wallet.create_transaction(Wallet::new().get_address()).is_none());
    }

    #[test]
    fn test_create_transaction_freezes_coin() {
        let mut ledger = Ledger::new();
        let mut wallet = funded(&mut ledger);
        let coin = wallet.unspent_coins().iter().next().unwrap().clone();

        let tx = wallet.create_transaction(Wallet::new().get_address()).unwrap();
        assert_eq!(tx.input(), Some(&coin.id()));
        assert!(ledger.validate(&tx));
        assert!(wallet.unspent_coins().is_empty());
        assert!(wallet.pending_spent_coins().contains(&coin));
        assert!(wallet.pending_own_txs().contains(&tx));
        // Balance only moves once the spend is committed.
        assert_eq!(wallet.get_balance(), 1);

        // The only coin is frozen.
        assert!(wallet.create_transaction(Wallet::new().get_address()).is_none());
    }

    #[test]
    fn test_unfreeze_allows_respend() {
        let mut ledger = Ledger::new();
        let mut wallet = funded(&mut ledger);
        let target = Wallet::new().get_address();

        let lost = wallet.create_transaction(target.clone()).unwrap();
        wallet.unfreeze_all();
        assert!(wallet.pending_spent_coins().is_empty());
        assert!(wallet.pending_own_txs().contains(&lost));

        let retry = wallet.create_transaction(target).unwrap();
        assert_eq!(retry.input(), lost.input());
        assert!(ledger.submit_transaction(retry));
    }

    #[test]
    fn test_spend_committed() {
        let mut ledger = Ledger::new();
        let mut wallet = funded(&mut ledger);
        let tx = wallet.create_transaction(Wallet::new().get_address()).unwrap();
        assert!(ledger.submit_transaction(tx.clone()));
        ledger.end_period(10).unwrap();

        wallet.update(&ledger).unwrap();
        assert_eq!(wallet.get_balance(), 0);
        assert!(wallet.outcome_txs().contains(&tx));
        assert!(wallet.pending_own_txs().is_empty());
        assert!(wallet.pending_spent_coins().is_empty());
        assert!(wallet.unspent_coins().is_empty());
    }

    #[test]
    fn test_spent_coin_not_reused_after_unfreeze() {
        let mut ledger = Ledger::new();
        let mut wallet = funded(&mut ledger);
        let tx = wallet.create_transaction(Wallet::new().get_address()).unwrap();
        assert!(ledger.submit_transaction(tx));
        wallet.unfreeze_all();
        ledger.end_period(10).unwrap();

        wallet.update(&ledger).unwrap();
        assert!(wallet.unspent_coins().is_empty());
        assert!(wallet.create_transaction(Wallet::new().get_address()).is_none());
    }

    #[test]
    fn test_self_transfer_keeps_balance() {
        let mut ledger = Ledger::new();
        let mut wallet = funded(&mut ledger);
        let tx = wallet.create_transaction(wallet.get_address()).unwrap();
        assert!(ledger.submit_transaction(tx.clone()));
        ledger.end_period(10).unwrap();

        wallet.update(&ledger).unwrap();
        assert_eq!(wallet.get_balance(), 1);
        assert!(wallet.unspent_coins().contains(&tx));
    }

    #[test]
    fn test_foreign_cursor_leaves_wallet_untouched() {
        let mut ledger = Ledger::new();
        let mut wallet = funded(&mut ledger);

        let mut other = Ledger::new();
        other.mint(wallet.get_address());
        other.end_period(10).unwrap();

        let err = wallet.update(&other).unwrap_err();
        assert!(matches!(err, WalletError::Ledger(LedgerError::NotFound(_))));
        assert_eq!(wallet.get_balance(), 1);
        assert_eq!(wallet.last_seen_hash(), ledger.get_latest_hash());
    }

    #[test]
    fn test_failed_lookup_leaves_wallet_untouched() {
        let mut ledger = Ledger::new();
        let mut wallet = funded(&mut ledger);
        let cursor = wallet.last_seen_hash();

        // A fresh coin ahead of a spend in the same block.
        ledger.mint(wallet.get_address());
        let tx = wallet.create_transaction(Wallet::new().get_address()).unwrap();
        assert!(ledger.submit_transaction(tx.clone()));
        ledger.end_period(10).unwrap();

        assert!(wallet.update(&NoHistory(&ledger)).is_err());
        assert_eq!(wallet.get_balance(), 1);
        assert_eq!(wallet.income_txs().len(), 1);
        assert!(wallet.unspent_coins().is_empty());
        assert_eq!(wallet.last_seen_hash(), cursor);

        wallet.update(&ledger).unwrap();
        assert_eq!(wallet.get_balance(), 1);
        assert_eq!(wallet.income_txs().len(), 2);
        assert!(wallet.outcome_txs().contains(&tx));
        assert_eq!(wallet.unspent_coins().len(), 1);
    }
}
