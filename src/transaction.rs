//! Transaction module split into types and validation for better modularity

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{resolve_input, validate_funds, FundsSummary};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use serde_json::json;

    #[test]
    fn test_hash_ignores_stored_hash_and_extra_fields() {
        let plain = Transaction::new(vec![], vec![TxOutput::new(50, "OP_DUP alice")]);
        let mut decorated = plain.clone();
        decorated.transaction_hash = "stale".to_string();
        decorated.extra.insert("memo".to_string(), json!("hello"));

        assert_eq!(plain.compute_hash(), decorated.compute_hash());
        assert_eq!(
            plain.compute_hash(),
            "4702f7fe2c3edf1484492cd9c71596452bc7b662f35e81c1077840e974aa1e32"
        );
    }

    #[test]
    fn test_hash_covers_output_extra_fields() {
        let plain = Transaction::new(vec![], vec![TxOutput::new(50, "alice")]);
        let mut tagged = plain.clone();
        tagged.outputs[0].extra.insert("tag".to_string(), json!(1));
        assert_ne!(plain.compute_hash(), tagged.compute_hash());
    }

    #[test]
    fn test_from_record_keeps_unknown_fields() {
        let record = json!({
            "inputs": [{"transaction_hash": "ab", "output_index": 0, "unlocking_script": "sig key", "sequence": 4}],
            "outputs": [{"amount": 10, "locking_script": "bob", "note": "rent"}],
            "memo": "march"
        });
        let tx = Transaction::from_record(0, record).unwrap();
        assert_eq!(tx.inputs[0].extra["sequence"], json!(4));
        assert_eq!(tx.outputs[0].extra["note"], json!("rent"));
        assert_eq!(tx.extra["memo"], json!("march"));
        assert!(tx.transaction_hash.is_empty());
    }

    #[test]
    fn test_from_record_missing_outputs_is_malformed() {
        let result = Transaction::from_record(3, json!({"inputs": []}));
        match result {
            Err(LedgerError::MalformedTransactionRecord { index, reason }) => {
                assert_eq!(index, 3);
                assert!(reason.contains("outputs"));
            }
            other => panic!("Expected MalformedTransactionRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_from_record_missing_amount_is_malformed() {
        let result = Transaction::from_record(0, json!({"inputs": [], "outputs": [{"locking_script": "bob"}]}));
        assert!(matches!(result, Err(LedgerError::MalformedTransactionRecord { .. })));
    }

    #[test]
    fn test_fractional_amount_is_accepted_and_hashed_as_written() {
        let record = json!({"inputs": [], "outputs": [{"amount": 2.5, "locking_script": "OP_DUP alice"}]});
        let tx = Transaction::from_record(0, record).unwrap();
        assert_eq!(tx.outputs[0].amount, 2.5);
        assert_eq!(
            tx.compute_hash(),
            "78f540a8338aea6e422fa041d792ee5702d297db1d4ed8467c4fbee1aaea87bf"
        );
        assert_eq!(tx.output_total().unwrap(), 2.5);
    }

    #[test]
    fn test_non_numeric_amount_is_malformed() {
        let result = Transaction::from_record(0, json!({"inputs": [], "outputs": [{"amount": "5", "locking_script": "bob"}]}));
        assert!(matches!(result, Err(LedgerError::MalformedTransactionRecord { .. })));
    }

    #[test]
    fn test_from_record_rejects_non_object() {
        let result = Transaction::from_record(1, json!(["inputs", "outputs"]));
        assert!(matches!(
            result,
            Err(LedgerError::MalformedTransactionRecord { index: 1, .. })
        ));
    }

    #[test]
    fn test_output_total_overflow() {
        let tx = Transaction::new(vec![], vec![TxOutput::new(u64::MAX, "a"), TxOutput::new(1, "b")]);
        assert_eq!(tx.output_total(), Err(LedgerError::AmountOverflow));
    }
}
