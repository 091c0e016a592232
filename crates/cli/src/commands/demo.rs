//! Scripted walkthrough of a single transfer.

use anyhow::{ensure, Context, Result};
use colored::Colorize;
use minibank_core::Block;
use minibank_ledger::Ledger;
use minibank_wallet::Wallet;

fn print_block(block: &Block) {
    println!(
        "    {} {} {}",
        block.to_string().bright_yellow(),
        "prev".bright_black(),
        block.prev_hash().to_hex()[..16].bright_black()
    );
    for tx in block.transactions() {
        println!("      {} -> {}", tx, tx.output().short().bright_cyan());
    }
}

pub fn run() -> Result<()> {
    println!("{}", "minibank demo".bold().cyan());
    println!();

    let mut bank = Ledger::new();
    let mut alice = Wallet::new();
    let mut bob = Wallet::new();
    println!("  Alice: {}", alice.get_address().to_hex().bright_yellow());
    println!("  Bob:   {}", bob.get_address().to_hex().bright_yellow());
    println!();

    bank.mint(alice.get_address());
    let block1 = bank.end_period(10)?;
    println!("{}  Minted a coin for Alice", "✓".green().bold());
    let committed = bank.get_block(&block1)?;
    print_block(&committed);

    alice.update(&bank)?;
    println!("{}  {}", "✓".green().bold(), alice);

    let tx = alice
        .create_transaction(bob.get_address())
        .context("Alice has nothing to spend")?;
    ensure!(bank.submit_transaction(tx.clone()), "bank rejected {}", tx);
    println!("{}  Bank accepted {} (Alice -> Bob)", "✓".green().bold(), tx);

    let again = alice.create_transaction(alice.get_address());
    println!(
        "{}  Alice cannot spend the frozen coin again: {}",
        "✓".green().bold(),
        if again.is_none() { "refused" } else { "allowed" }
    );

    let block2 = bank.end_period(10)?;
    println!("{}  Committed transfer", "✓".green().bold());
    let committed = bank.get_block(&block2)?;
    print_block(&committed);

    bob.update(&bank)?;
    alice.update(&bank)?;
    println!("{}  {}", "✓".green().bold(), alice);
    println!("{}  {}", "✓".green().bold(), bob);

    ensure!(
        alice.get_balance() == 0 && bob.get_balance() == 1,
        "unexpected balances after transfer"
    );
    println!();
    println!("{}", bank.to_string().green().bold());
    Ok(())
}
