//! Wallet client for minibank.
//!
//! A wallet holds one keypair and a local view of its coins. It pulls new
//! blocks from any [`minibank_ledger::BlockSource`] and replays only those it
//! has not seen yet.
//!
//! # Example
//!
//! ```rust
//! use minibank_ledger::Ledger;
//! use minibank_wallet::Wallet;
//!
//! let mut bank = Ledger::new();
//! let mut alice = Wallet::new();
//! let mut bob = Wallet::new();
//!
//! bank.mint(alice.get_address());
//! bank.end_period(10).unwrap();
//! alice.update(&bank).unwrap();
//!
//! let tx = alice.create_transaction(bob.get_address()).unwrap();
//! assert!(bank.submit_transaction(tx));
//! bank.end_period(10).unwrap();
//!
//! alice.update(&bank).unwrap();
//! bob.update(&bank).unwrap();
//! assert_eq!((alice.get_balance(), bob.get_balance()), (0, 1));
//! ```

pub mod wallet;

pub use wallet::{Result, Wallet, WalletError};
