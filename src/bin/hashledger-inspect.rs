#![forbid(unsafe_code)]
//! Offline queries over a chain export file.

use clap::{Parser, Subcommand};
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color as TableColor, ContentArrangement, Table};
use hashledger::blockchain::{verify_chain, Block, BlockRecord, GenesisScan};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Chain export: a JSON array of blocks, head first
    export: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints the number of blocks in the chain
    Length,
    /// Looks up a transaction by hash
    Find {
        hash: String,
        /// Leave the genesis block out of the search
        #[arg(long)]
        exclusive_genesis: bool,
    },
    /// Sums outputs whose locking script names the identity
    Receipts {
        identity: String,
        /// Leave the genesis block out of the scan
        #[arg(long)]
        exclusive_genesis: bool,
    },
    /// Recomputes every header hash and checks each link
    Verify,
}

fn scan(exclusive: bool) -> GenesisScan {
    if exclusive {
        GenesisScan::Exclusive
    } else {
        GenesisScan::Inclusive
    }
}

fn short(hash: &str) -> String {
    if hash.len() > 16 {
        format!("{}...", &hash[..13])
    } else {
        hash.to_string()
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let text = fs::read_to_string(&cli.export)
        .map_err(|e| format!("Failed to read {}: {}", cli.export.display(), e))?;
    let records: Vec<BlockRecord> = serde_json::from_str(&text)?;
    let head = Block::from_chain_export(records)?;
    debug!(blocks = head.chain_length(), head = %head.hash(), "inspect.loaded");

    match cli.command {
        Commands::Length => {
            println!("{}", head.chain_length());
        }
        Commands::Find { hash, exclusive_genesis } => {
            match head.find_transaction_with(&hash, scan(exclusive_genesis)) {
                Some(tx) => println!("{}", serde_json::to_string_pretty(tx)?),
                None => {
                    eprintln!("{}", format!("Transaction {} not found", hash).yellow());
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Receipts { identity, exclusive_genesis } => {
            let receipts = head.gross_receipts_with(&identity, scan(exclusive_genesis));

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    Cell::new("Transaction").add_attribute(Attribute::Bold),
                    Cell::new("Amount").add_attribute(Attribute::Bold),
                ]);
            for utxo in &receipts.utxos {
                table.add_row(vec![
                    Cell::new(short(&utxo.transaction_hash)),
                    Cell::new(utxo.amount).fg(TableColor::Green),
                ]);
            }

            println!("{} {}", "Identity:".bright_white(), identity.cyan());
            println!("{table}");
            println!("{} {}", "Total received:".bright_white(), receipts.total.to_string().bright_green().bold());
        }
        Commands::Verify => match verify_chain(&head) {
            Ok(()) => println!("{} {} blocks", "✓ chain valid:".green().bold(), head.chain_length()),
            Err(e) => {
                eprintln!("{} {}", "✗ chain invalid:".red().bold(), e);
                return Ok(ExitCode::FAILURE);
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}
