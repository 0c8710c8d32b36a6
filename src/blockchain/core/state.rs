//! Read-only queries over a chain, walking backward from a given block.

use super::chain::Block;
use crate::numeric::Numeric;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Script tokens starting with this prefix are opcodes and never name an
/// identity.
pub const OPCODE_PREFIX: &str = "OP";

/// Whether a backward scan also visits the block without a predecessor.
///
/// `Exclusive` reproduces the historical scan loop, which stopped before the
/// genesis block and so never saw its transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenesisScan {
    #[default]
    Inclusive,
    Exclusive,
}

/// One output paid to an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedOutput {
    pub amount: Numeric,
    pub transaction_hash: String,
}

/// Everything ever paid to an identity, found by script-token match.
///
/// Outputs later consumed as inputs are still counted: this is gross receipts,
/// not a spendable balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrossReceipts {
    pub identity: String,
    pub total: Numeric,
    pub utxos: Vec<ReceivedOutput>,
}

impl GrossReceipts {
    fn empty(identity: &str) -> Self {
        GrossReceipts {
            identity: identity.to_string(),
            total: Numeric::ZERO,
            utxos: Vec::new(),
        }
    }
}

fn names_identity(token: &str, identity: &str) -> bool {
    !token.starts_with(OPCODE_PREFIX) && token == identity
}

impl Block {
    fn scanned(&self, scan: GenesisScan) -> impl Iterator<Item = &Block> {
        self.iter()
            .filter(move |b| scan == GenesisScan::Inclusive || !b.is_genesis())
    }

    /// First transaction with `transaction_hash == hash`, searching this block
    /// and every predecessor including genesis.
    pub fn find_transaction(&self, hash: &str) -> Option<&Transaction> {
        self.find_transaction_with(hash, GenesisScan::Inclusive)
    }

    pub fn find_transaction_with(&self, hash: &str, scan: GenesisScan) -> Option<&Transaction> {
        let found = self
            .scanned(scan)
            .flat_map(|b| b.transactions().iter())
            .find(|tx| tx.transaction_hash == hash);
        debug!(hash, found = found.is_some(), "chain.find_transaction");
        found
    }

    /// Sums every output whose locking script names `identity`, including the
    /// genesis block.
    pub fn gross_receipts(&self, identity: &str) -> GrossReceipts {
        self.gross_receipts_with(identity, GenesisScan::Inclusive)
    }

    /// An output is counted once per script token equal to `identity`;
    /// opcode tokens never match. Integer totals saturate; any fractional
    /// amount makes the total fractional.
    pub fn gross_receipts_with(&self, identity: &str, scan: GenesisScan) -> GrossReceipts {
        let mut receipts = GrossReceipts::empty(identity);
        for tx in self.scanned(scan).flat_map(|b| b.transactions().iter()) {
            for output in &tx.outputs {
                for token in output.script_tokens() {
                    if names_identity(token, identity) {
                        receipts.total = receipts.total.saturating_add(output.amount);
                        receipts.utxos.push(ReceivedOutput {
                            amount: output.amount,
                            transaction_hash: tx.transaction_hash.clone(),
                        });
                    }
                }
            }
        }
        debug!(identity, total = %receipts.total, outputs = receipts.utxos.len(), "chain.gross_receipts");
        receipts
    }
}
