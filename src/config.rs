//! Configuration management for hashledger

use crate::blockchain::{Block, BlockHeader, GenesisScan};
use crate::error::{LedgerError, Result};
use crate::numeric::Numeric;
use crate::transaction::{Transaction, TxOutput};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_CONFIG_PATH: &str = "hashledger.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub genesis: GenesisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub genesis_scan: GenesisScan,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenesisConfig {
    #[serde(default)]
    pub previous_block_hash: String,
    #[serde(default = "default_merkle_root")]
    pub merkle_root: String,
    #[serde(default = "default_genesis_timestamp")]
    pub timestamp: Numeric,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub outputs: Vec<GenesisOutput>,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            previous_block_hash: String::new(),
            merkle_root: default_merkle_root(),
            timestamp: default_genesis_timestamp(),
            nonce: 0,
            outputs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenesisOutput {
    pub amount: Numeric,
    pub locking_script: String,
}

impl GenesisConfig {
    /// The genesis block described by this section. Configured outputs become
    /// a single input-less transaction.
    pub fn build_block(&self) -> Block {
        let header = BlockHeader::new(
            self.previous_block_hash.clone(),
            self.timestamp,
            self.nonce,
            self.merkle_root.clone(),
        );
        let transactions = if self.outputs.is_empty() {
            Vec::new()
        } else {
            let outputs = self
                .outputs
                .iter()
                .map(|o| TxOutput::new(o.amount, o.locking_script.clone()))
                .collect();
            vec![Transaction::new(Vec::new(), outputs)]
        };
        Block::new(transactions, header, None)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl LoggingConfig {
    /// Installs the global fmt subscriber. `RUST_LOG` wins over the configured
    /// filter when set. Calling this twice is harmless.
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.filter));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_merkle_root() -> String {
    "genesis".to_string()
}

fn default_genesis_timestamp() -> Numeric {
    Numeric::Float(1672531200.0)
}

fn default_log_filter() -> String {
    "info".to_string()
}

pub fn parse_config(text: &str) -> Result<Config> {
    let config: Config = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Loads `path` (or `hashledger.toml`). A missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    match fs::read_to_string(path) {
        Ok(text) => parse_config(&text),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(LedgerError::Config(format!("Failed to read {}: {}", path.display(), e))),
    }
}

impl Config {
    fn validate(&self) -> Result<()> {
        if self.api.port == 0 {
            return Err(LedgerError::Config("api.port must be non-zero".to_string()));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(LedgerError::Config("logging.filter must not be empty".to_string()));
        }
        Ok(())
    }
}
