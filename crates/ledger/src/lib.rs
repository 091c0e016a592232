//! Centralized bank ledger for minibank.
//!
//! This crate owns everything on the bank side of the system:
//! - **Validation**: ordered admission rules for submitted transfers
//! - **Mempool**: FIFO queue of accepted, uncommitted transactions
//! - **UTXO set**: the coins that are currently spendable
//! - **Ledger**: block commits and the append-only chain
//! - **SharedLedger**: a lock-guarded handle for concurrent callers
//!
//! # Example
//!
//! ```rust
//! use minibank_core::{Keypair, Transaction};
//! use minibank_ledger::Ledger;
//!
//! let mut ledger = Ledger::new();
//! let alice = Keypair::generate();
//! let bob = Keypair::generate();
//!
//! // Only the bank can create coins.
//! let coin = ledger.mint(alice.public_key.clone());
//! ledger.end_period(10).unwrap();
//!
//! let tx = Transaction::signed_transfer(&alice, coin, bob.public_key.clone());
//! assert!(ledger.submit_transaction(tx));
//! let block = ledger.end_period(10).unwrap();
//! assert_eq!(ledger.get_latest_hash(), block);
//! ```

pub mod ledger;
pub mod mempool;
pub mod shared;
pub mod source;
pub mod utxo;
pub mod validator;

// Re-export commonly used types
pub use ledger::{Ledger, LedgerConfig, LedgerError, LedgerStats, Result};
pub use mempool::{Mempool, MempoolError};
pub use shared::SharedLedger;
pub use source::BlockSource;
pub use utxo::UtxoSet;
pub use validator::ValidationError;
