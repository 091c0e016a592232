//! Simulation configuration.

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Parameters of a simulated economy. Every field may be omitted from a
/// config file and falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of wallets, each minted one coin up front.
    pub wallets: usize,
    /// Number of periods to run.
    pub rounds: usize,
    /// Transactions committed per period.
    pub block_limit: usize,
    /// Chance that a wallet attempts a spend in a round.
    pub spend_rate: f64,
    /// Chance that a created transaction is lost before reaching the bank.
    pub drop_rate: f64,
    /// Seed for the choice generator; keys are always random.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            wallets: 4,
            rounds: 5,
            block_limit: 10,
            spend_rate: 0.7,
            drop_rate: 0.1,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Load a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.wallets >= 2, "need at least 2 wallets, got {}", self.wallets);
        ensure!(
            self.block_limit >= 1,
            "block_limit must be at least 1, got {}",
            self.block_limit
        );
        ensure!(
            (0.0..=1.0).contains(&self.spend_rate),
            "spend_rate must be within [0, 1], got {}",
            self.spend_rate
        );
        ensure!(
            (0.0..=1.0).contains(&self.drop_rate),
            "drop_rate must be within [0, 1], got {}",
            self.drop_rate
        );
        Ok(())
    }
}
