/// Transaction record types for hashledger
use crate::error::{LedgerError, Result};
use crate::hashing::{self, Layout};
use crate::numeric::Numeric;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Indentation of the canonical text a transaction hash is computed over.
pub const TRANSACTION_HASH_INDENT: usize = 2;

/// Reference to a previous output plus the script that unlocks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxInput {
    pub transaction_hash: String,
    pub output_index: usize,
    pub unlocking_script: String,
    /// Fields this crate does not interpret; kept, serialized and hashed.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TxInput {
    pub fn new(transaction_hash: impl Into<String>, output_index: usize, unlocking_script: impl Into<String>) -> Self {
        TxInput {
            transaction_hash: transaction_hash.into(),
            output_index,
            unlocking_script: unlocking_script.into(),
            extra: Map::new(),
        }
    }
}

/// An amount locked by a script, e.g. `"OP_DUP OP_HASH160 alice OP_EQUAL_VERIFY OP_CHECKSIG"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Integer or fractional; the form it arrived in is kept for hashing.
    pub amount: Numeric,
    pub locking_script: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TxOutput {
    pub fn new(amount: impl Into<Numeric>, locking_script: impl Into<String>) -> Self {
        TxOutput {
            amount: amount.into(),
            locking_script: locking_script.into(),
            extra: Map::new(),
        }
    }

    /// Whitespace-separated tokens of the locking script.
    pub fn script_tokens(&self) -> impl Iterator<Item = &str> {
        self.locking_script.split_whitespace()
    }
}

/// A value transfer. `transaction_hash` is empty until the transaction is
/// attached to a block (or admitted to the mempool).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    #[serde(default)]
    pub transaction_hash: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The exact content a transaction hash commits to.
#[derive(Serialize)]
struct HashContent<'a> {
    inputs: &'a [TxInput],
    outputs: &'a [TxOutput],
}

impl Transaction {
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Transaction {
            inputs,
            outputs,
            transaction_hash: String::new(),
            extra: Map::new(),
        }
    }

    /// Parses a dynamically shaped record. `index` is the record's position
    /// in the list it came from and is reported back on failure.
    pub fn from_record(index: usize, record: Value) -> Result<Self> {
        if !record.is_object() {
            return Err(LedgerError::MalformedTransactionRecord {
                index,
                reason: "record is not an object".to_string(),
            });
        }
        serde_json::from_value(record).map_err(|e| LedgerError::MalformedTransactionRecord {
            index,
            reason: e.to_string(),
        })
    }

    /// Hash of exactly `{inputs, outputs}`; the stored `transaction_hash` and
    /// any extra top-level fields are not part of it.
    pub fn compute_hash(&self) -> String {
        let content = HashContent {
            inputs: &self.inputs,
            outputs: &self.outputs,
        };
        hashing::digest(&content, Layout::Indented(TRANSACTION_HASH_INDENT))
            .expect("transaction content is plain JSON")
    }

    pub fn with_computed_hash(mut self) -> Self {
        self.transaction_hash = self.compute_hash();
        self
    }

    pub fn output_total(&self) -> Result<Numeric> {
        self.outputs
            .iter()
            .try_fold(Numeric::ZERO, |acc, out| acc.checked_add(out.amount))
            .ok_or(LedgerError::AmountOverflow)
    }
}
