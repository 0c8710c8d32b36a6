#![forbid(unsafe_code)]
//! Ledger node: genesis from config, then the REST API.

use clap::Parser;
use colored::*;
use hashledger::config::load_config;
use hashledger::node::Node;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML config file (defaults to ./hashledger.toml)
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Overrides `api.port`
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.api.port = port;
    }
    config.logging.init();

    let node = Node::init(config);
    let addr = node.api_addr()?;
    println!("{}", "hashledger node".bright_cyan().bold());
    println!("  {} {}", "genesis:".bright_white(), node.chain.head().hash());
    println!("  {} http://{}/api", "api:".bright_white(), addr);

    node.run().await?;
    Ok(())
}
