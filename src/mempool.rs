//! Pool of admitted transactions waiting to be included in a block.

use crate::blockchain::Block;
use crate::error::{LedgerError, Result};
use crate::transaction::Transaction;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct Mempool {
    transactions: Vec<Transaction>,
    hashes: HashSet<String>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `tx` stamped with its computed hash and returns that hash.
    pub fn add(&mut self, tx: Transaction) -> Result<String> {
        let tx = tx.with_computed_hash();
        if !self.hashes.insert(tx.transaction_hash.clone()) {
            return Err(LedgerError::DuplicateTransaction(tx.transaction_hash));
        }
        let hash = tx.transaction_hash.clone();
        self.transactions.push(tx);
        Ok(hash)
    }

    pub fn get(&self, hash: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.transaction_hash == hash)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Drops every pending transaction that `block` carries and returns how
    /// many were removed.
    pub fn remove_included(&mut self, block: &Block) -> usize {
        let before = self.transactions.len();
        for tx in block.transactions() {
            self.hashes.remove(&tx.transaction_hash);
        }
        let hashes = &self.hashes;
        self.transactions.retain(|tx| hashes.contains(&tx.transaction_hash));
        before - self.transactions.len()
    }

    /// Removes and returns every pending transaction in admission order.
    pub fn drain(&mut self) -> Vec<Transaction> {
        self.hashes.clear();
        std::mem::take(&mut self.transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::BlockHeader;
    use crate::transaction::TxOutput;

    #[test]
    fn test_add_and_get() {
        let mut pool = Mempool::new();
        let tx = Transaction::new(vec![], vec![TxOutput::new(5, "bob")]);
        let hash = pool.add(tx.clone()).unwrap();
        assert_eq!(hash, tx.compute_hash());
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(&hash).unwrap().outputs, tx.outputs);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut pool = Mempool::new();
        let tx = Transaction::new(vec![], vec![TxOutput::new(5, "bob")]);
        pool.add(tx.clone()).unwrap();
        assert!(matches!(pool.add(tx), Err(LedgerError::DuplicateTransaction(_))));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_remove_included_keeps_the_rest() {
        let mut pool = Mempool::new();
        let mined = Transaction::new(vec![], vec![TxOutput::new(1, "a")]);
        let pending = Transaction::new(vec![], vec![TxOutput::new(2, "b")]);
        pool.add(mined.clone()).unwrap();
        let pending_hash = pool.add(pending).unwrap();

        let block = Block::new(vec![mined.clone()], BlockHeader::new("", 1.0, 0, "r"), None);
        assert_eq!(pool.remove_included(&block), 1);
        assert_eq!(pool.len(), 1);
        assert!(pool.get(&pending_hash).is_some());
        assert!(pool.add(mined).is_ok());

        let empty = Block::new(vec![], BlockHeader::new("", 2.0, 0, "r"), None);
        assert_eq!(pool.remove_included(&empty), 0);
    }

    #[test]
    fn test_drain_empties_pool() {
        let mut pool = Mempool::new();
        pool.add(Transaction::new(vec![], vec![TxOutput::new(1, "a")])).unwrap();
        pool.add(Transaction::new(vec![], vec![TxOutput::new(2, "b")])).unwrap();
        let drained = pool.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].outputs[0].amount, 1);
        assert!(pool.is_empty());
        assert!(pool.add(drained[0].clone()).is_ok());
    }
}
