//! Admission checks for incoming transactions.
//!
//! Inputs are resolved against the chain and amounts must balance exactly.
//! Unlocking scripts are not executed: that needs signature verification,
//! which this crate does not do.

use crate::blockchain::Block;
use crate::error::{LedgerError, Result};
use crate::numeric::Numeric;
use crate::transaction::{Transaction, TxInput, TxOutput};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FundsSummary {
    pub inputs_total: Numeric,
    pub outputs_total: Numeric,
}

/// Finds the output an input spends. The whole history is searched,
/// genesis included.
pub fn resolve_input<'a>(chain: &'a Block, input: &TxInput) -> Result<&'a TxOutput> {
    let source = chain
        .find_transaction(&input.transaction_hash)
        .ok_or_else(|| LedgerError::UnknownUtxo {
            transaction_hash: input.transaction_hash.clone(),
            output_index: input.output_index,
        })?;
    source
        .outputs
        .get(input.output_index)
        .ok_or_else(|| LedgerError::InvalidOutputIndex {
            transaction_hash: input.transaction_hash.clone(),
            output_index: input.output_index,
        })
}

pub fn validate_funds(chain: &Block, tx: &Transaction) -> Result<FundsSummary> {
    let mut inputs_total = Numeric::ZERO;
    for input in &tx.inputs {
        let spent = resolve_input(chain, input)?;
        inputs_total = inputs_total
            .checked_add(spent.amount)
            .ok_or(LedgerError::AmountOverflow)?;
    }
    let outputs_total = tx.output_total()?;

    debug!(%inputs_total, %outputs_total, "transaction.validate_funds");
    if inputs_total != outputs_total {
        return Err(LedgerError::FundsMismatch {
            inputs: inputs_total,
            outputs: outputs_total,
        });
    }
    Ok(FundsSummary {
        inputs_total,
        outputs_total,
    })
}
