#![forbid(unsafe_code)]
//! Command-line driver: builds a demo chain from random transfers, or verifies a chain file.

use clap::{Parser, Subcommand};
use colored::*;
use ledgerchain::blockchain::{make_block, Chain, LedgerState, Verifier};
use ledgerchain::config::{load_config, Config, DemoConfig, VerifierConfig};
use ledgerchain::transaction::{AccountId, Transaction};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./ledgerchain.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides logging.level from the configuration
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Builds a chain from random transfers, verifies it and offers it a foreign block
    Demo {
        /// Where to write the resulting chain as JSON
        #[arg(long)]
        out: Option<PathBuf>,
        /// Seed for the transaction generator
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Verifies a JSON chain file and prints the resulting balances
    Verify {
        /// Path to the chain file
        path: PathBuf,
        /// Reject blocks whose txn_count disagrees with their transaction list
        #[arg(long)]
        strict_txn_count: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let level: tracing::Level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.logging.level)
        .parse()?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Demo { out, seed } => demo(&config, out.as_deref(), *seed),
        Commands::Verify { path, strict_txn_count } => {
            let verifier = Verifier::new(VerifierConfig {
                strict_txn_count: *strict_txn_count || config.verifier.strict_txn_count,
            });
            verify(&verifier, path)
        }
    }
}

/// A random transfer between two distinct accounts; every other account is
/// listed with a zero delta.
fn random_transfer(rng: &mut StdRng, accounts: &[AccountId], max_transfer: i64) -> Transaction {
    let mut pool: Vec<&AccountId> = accounts.iter().collect();
    let sender = pool.remove(rng.gen_range(0..pool.len()));
    let receiver = pool.remove(rng.gen_range(0..pool.len()));
    let amount = rng.gen_range(1..=max_transfer);

    pool.into_iter().fold(
        Transaction::transfer(sender.clone(), receiver.clone(), amount),
        |txn, bystander| txn.with_participant(bystander.clone()),
    )
}

/// Packs valid transactions from `pending` into blocks of at most
/// `block_size_limit`, skipping the ones that do not apply. Returns the state
/// at the new tip.
fn fill_chain(
    chain: &mut Chain,
    mut state: LedgerState,
    mut pending: Vec<Transaction>,
    block_size_limit: usize,
) -> Result<LedgerState, Box<dyn std::error::Error>> {
    let mut skipped = 0usize;
    while !pending.is_empty() {
        let mut batch = Vec::with_capacity(block_size_limit);
        while batch.len() < block_size_limit {
            let Some(txn) = pending.pop() else { break };
            match txn.check(&state) {
                Ok(()) => {
                    state = state.apply(&txn);
                    batch.push(txn);
                }
                Err(reason) => {
                    skipped += 1;
                    println!("{} {} ({})", "ignored transaction".yellow(), txn, reason);
                }
            }
        }
        if !batch.is_empty() {
            chain.extend(batch)?;
        }
    }
    if skipped > 0 {
        println!("{}", format!("{} transactions ignored", skipped).yellow());
    }
    Ok(state)
}

fn demo(config: &Config, out: Option<&Path>, seed: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let DemoConfig {
        block_size_limit,
        txn_buffer_count,
        max_transfer,
        foreign_block_txns,
        initial_balances,
    } = &config.demo;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let accounts: Vec<AccountId> = initial_balances.keys().cloned().collect();
    let genesis_state = LedgerState::from_balances(initial_balances.clone());

    println!("{}", "LedgerChain demo".bright_cyan().bold());
    println!("Genesis balances: {}", genesis_state.to_string().bright_white());

    let mut chain = Chain::new(&genesis_state)?;
    let pending: Vec<Transaction> = (0..*txn_buffer_count)
        .map(|_| random_transfer(&mut rng, &accounts, *max_transfer))
        .collect();
    let state = fill_chain(&mut chain, genesis_state, pending, *block_size_limit)?;

    let verifier = Verifier::new(config.verifier);
    let verified = verifier.check_chain(chain.blocks())?;
    println!(
        "{} {} blocks, balances {}",
        "Chain verified:".bright_green(),
        chain.len(),
        verified.to_string().bright_white()
    );
    debug_assert_eq!(verified, state);

    let foreign_txns: Vec<Transaction> = (0..*foreign_block_txns)
        .map(|_| random_transfer(&mut rng, &accounts, *max_transfer))
        .collect();
    let foreign = make_block(foreign_txns, chain.tip())?;

    println!("Chain is currently {} blocks long", chain.len());
    println!("New block received; checking validity...");
    let state = match chain.accept(foreign, &verified) {
        Ok(next) => {
            println!("{}", "Block accepted".bright_green());
            next
        }
        Err(e) => {
            println!("{} {}", "Invalid block; ignoring:".red(), e);
            verified
        }
    };
    println!("Chain is now {} blocks long", chain.len());
    println!("Final balances: {}", state.to_string().bright_white());

    if let Some(path) = out {
        fs::write(path, chain.to_json()?)?;
        println!("Chain written to {}", path.display());
    }
    Ok(())
}

fn verify(verifier: &Verifier, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        path = %path.display(),
        strict_txn_count = verifier.config().strict_txn_count,
        "verifying chain file"
    );
    let text = fs::read_to_string(path)?;
    match verifier.check_chain_json(&text) {
        Ok(state) => {
            println!("{}", "Chain is valid".bright_green().bold());
            for (account, balance) in state.iter() {
                println!("  {:<16} {}", account.bright_white(), balance);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "Chain is invalid:".red().bold(), e);
            Err(e.into())
        }
    }
}
