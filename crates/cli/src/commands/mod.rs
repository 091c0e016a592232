//! CLI commands module.

use anyhow::Result;
use clap::Subcommand;

mod demo;
mod simulate;

pub use simulate::SimulateArgs;

#[derive(Subcommand)]
pub enum Commands {
    /// Walk through a mint, a transfer and both wallets reconciling
    Demo,
    /// Run a randomized economy of wallets against one bank
    Simulate(SimulateArgs),
}

pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Demo => demo::run(),
        Commands::Simulate(args) => simulate::run(args),
    }
}
