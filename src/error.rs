//! Error types for hashledger

use crate::numeric::Numeric;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("Malformed transaction record at index {index}: {reason}")]
    MalformedTransactionRecord { index: usize, reason: String },
    #[error("Header hash mismatch: expected {expected}, found {found}")]
    HashMismatch { expected: String, found: String },
    #[error("Invalid block linkage: expected previous hash {expected}, found {found}")]
    InvalidBlockLinkage { expected: String, found: String },
    #[error("Block already exists")]
    BlockAlreadyExists,
    #[error("Chain export contains no blocks")]
    EmptyChain,
    #[error("No transaction with UTXO hash exists: {transaction_hash}:{output_index}")]
    UnknownUtxo {
        transaction_hash: String,
        output_index: usize,
    },
    #[error("UTXO hash/output index combination not valid: {transaction_hash}:{output_index}")]
    InvalidOutputIndex {
        transaction_hash: String,
        output_index: usize,
    },
    #[error("Transaction inputs and outputs did not match: inputs ({inputs}), outputs ({outputs})")]
    FundsMismatch { inputs: Numeric, outputs: Numeric },
    #[error("Transaction amounts overflow")]
    AmountOverflow,
    #[error("Transaction already in mempool: {0}")]
    DuplicateTransaction(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, LedgerError>;
