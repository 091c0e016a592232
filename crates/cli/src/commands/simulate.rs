//! Randomized economy: wallets pass coins around through one bank.

use crate::config::SimulationConfig;
use anyhow::{ensure, Result};
use clap::Args;
use colored::Colorize;
use minibank_core::Block;
use minibank_ledger::{Ledger, LedgerConfig};
use minibank_wallet::Wallet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct SimulateArgs {
    /// JSON file with simulation parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of wallets
    #[arg(short, long)]
    wallets: Option<usize>,

    /// Number of periods to run
    #[arg(short, long)]
    rounds: Option<usize>,

    /// Transactions committed per period
    #[arg(short, long)]
    block_limit: Option<usize>,

    /// Seed for spend and drop decisions
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print the report and chain as JSON
    #[arg(long)]
    json: bool,
}

impl SimulateArgs {
    fn resolve(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(wallets) = self.wallets {
            config.wallets = wallets;
        }
        if let Some(rounds) = self.rounds {
            config.rounds = rounds;
        }
        if let Some(block_limit) = self.block_limit {
            config.block_limit = block_limit;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Outcome of a simulation run.
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub blocks: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub dropped: usize,
    pub unspent_outputs: usize,
    pub tip: String,
    pub balances: Vec<WalletBalance>,
    pub chain: Vec<Block>,
}

#[derive(Debug, Serialize)]
pub struct WalletBalance {
    pub address: String,
    pub balance: u64,
}

/// Run the economy described by `config` to completion.
///
/// Every pending transaction is committed before the report is taken, so the
/// wallet balances must add up to the size of the UTXO set.
pub fn simulate(config: &SimulationConfig) -> Result<SimulationReport> {
    config.validate()?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut bank = Ledger::with_config(LedgerConfig {
        default_block_limit: config.block_limit,
    });
    let mut wallets: Vec<Wallet> = (0..config.wallets).map(|_| Wallet::new()).collect();

    for wallet in &wallets {
        bank.mint(wallet.get_address());
    }
    bank.end_period_default();

    let (mut accepted, mut rejected, mut dropped) = (0, 0, 0);
    for round in 0..config.rounds {
        for i in 0..wallets.len() {
            wallets[i].update(&bank)?;
            if !rng.gen_bool(config.spend_rate) {
                continue;
            }

            let mut j = rng.gen_range(0..wallets.len() - 1);
            if j >= i {
                j += 1;
            }
            let target = wallets[j].get_address();
            let Some(tx) = wallets[i].create_transaction(target) else {
                continue;
            };

            if rng.gen_bool(config.drop_rate) {
                // Lost on the way; free the coin for a later retry.
                dropped += 1;
                wallets[i].unfreeze_all();
            } else if bank.submit_transaction(tx) {
                accepted += 1;
            } else {
                rejected += 1;
            }
        }
        let block = bank.end_period_default();
        info!(round, block = %block, "period ended");
    }

    while !bank.get_mempool().is_empty() {
        bank.end_period_default();
    }
    for wallet in wallets.iter_mut() {
        wallet.update(&bank)?;
    }

    let total: u64 = wallets.iter().map(|w| w.get_balance()).sum();
    let unspent_outputs = bank.get_utxo().len();
    ensure!(
        total as usize == unspent_outputs,
        "wallet balances ({}) disagree with the UTXO set ({})",
        total,
        unspent_outputs
    );

    Ok(SimulationReport {
        blocks: bank.height(),
        accepted,
        rejected,
        dropped,
        unspent_outputs,
        tip: bank.get_latest_hash().to_hex(),
        balances: wallets
            .iter()
            .map(|w| WalletBalance {
                address: w.get_address().to_hex(),
                balance: w.get_balance(),
            })
            .collect(),
        chain: bank.blocks().map(|b| Block::clone(b)).collect(),
    })
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let config = args.resolve()?;
    let report = simulate(&config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Simulation finished".bold().cyan());
    println!();
    for (height, block) in report.chain.iter().enumerate() {
        println!(
            "  {} {}",
            format!("#{}", height + 1).bright_black(),
            block.to_string().bright_yellow()
        );
    }
    println!();
    println!("  Accepted:  {}", report.accepted.to_string().green());
    println!("  Rejected:  {}", report.rejected.to_string().red());
    println!("  Dropped:   {}", report.dropped.to_string().yellow());
    println!("  Unspent:   {}", report.unspent_outputs.to_string().bright_cyan());
    println!("  Tip:       {}", report.tip[..16].bright_yellow());
    println!();
    println!("{}", "Balances:".bold());
    for entry in &report.balances {
        println!(
            "  {} {}",
            entry.address[..16].bright_yellow(),
            entry.balance.to_string().bright_cyan()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_conserves_coins() {
        let config = SimulationConfig {
            wallets: 5,
            rounds: 8,
            block_limit: 3,
            seed: Some(7),
            ..Default::default()
        };
        let report = simulate(&config).unwrap();

        let total: u64 = report.balances.iter().map(|b| b.balance).sum();
        assert_eq!(total, 5);
        assert_eq!(report.unspent_outputs, 5);
        assert_eq!(report.blocks, report.chain.len());
        assert!(report.blocks > config.rounds);
    }

    #[test]
    fn test_simulation_without_spending() {
        let config = SimulationConfig {
            wallets: 3,
            rounds: 2,
            spend_rate: 0.0,
            seed: Some(1),
            ..Default::default()
        };
        let report = simulate(&config).unwrap();

        assert_eq!(report.accepted, 0);
        assert!(report.balances.iter().all(|b| b.balance == 1));
        // One minting block plus one block per round.
        assert_eq!(report.blocks, 3);
    }

    #[test]
    fn test_dropped_transactions_are_retried() {
        let config = SimulationConfig {
            wallets: 2,
            rounds: 4,
            spend_rate: 1.0,
            drop_rate: 1.0,
            seed: Some(3),
            ..Default::default()
        };
        let report = simulate(&config).unwrap();

        assert_eq!(report.accepted, 0);
        assert_eq!(report.dropped, 8);
        assert!(report.balances.iter().all(|b| b.balance == 1));
    }

    #[test]
    fn test_zero_block_limit_refused() {
        let config = SimulationConfig {
            wallets: 2,
            rounds: 1,
            block_limit: 0,
            seed: Some(1),
            ..Default::default()
        };
        assert!(simulate(&config).is_err());
    }

    #[test]
    fn test_report_serializes() {
        let config = SimulationConfig {
            wallets: 2,
            rounds: 1,
            seed: Some(11),
            ..Default::default()
        };
        let report = simulate(&config).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["balances"].as_array().unwrap().len(), 2);
        assert_eq!(json["chain"].as_array().unwrap().len(), report.blocks);
    }
}
