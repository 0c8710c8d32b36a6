use super::chain::{Block, BlockHeader, BlockRecord};
use super::validation::check_candidate;
use crate::error::Result;
use crate::transaction::Transaction;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// The process-wide "current chain head".
///
/// Readers take an `Arc` snapshot and traverse it without holding the lock;
/// writers replace the slot under the write lock, so a traversal never sees
/// a head change halfway through.
pub struct ChainHead {
    head: RwLock<Arc<Block>>,
}

impl ChainHead {
    pub fn new(genesis: Block) -> Self {
        Self::from_arc(Arc::new(genesis))
    }

    pub fn from_arc(head: Arc<Block>) -> Self {
        info!(hash = %head.hash(), length = head.chain_length(), "chain.head.init");
        ChainHead {
            head: RwLock::new(head),
        }
    }

    pub fn head(&self) -> Arc<Block> {
        self.head.read().clone()
    }

    /// Installs `new_head` and returns the previous head.
    pub fn replace(&self, new_head: Arc<Block>) -> Arc<Block> {
        let mut slot = self.head.write();
        info!(from = %slot.hash(), to = %new_head.hash(), "chain.head.replace");
        std::mem::replace(&mut *slot, new_head)
    }

    /// Builds a block on top of the current head and makes it the new head.
    pub fn append(&self, transactions: Vec<Transaction>, header: BlockHeader) -> Arc<Block> {
        let mut slot = self.head.write();
        let block = Arc::new(Block::new(transactions, header, Some(slot.clone())));
        *slot = block.clone();
        info!(hash = %block.hash(), length = block.chain_length(), "chain.head.append");
        block
    }

    /// Checks `candidate` against the current head and appends it. The check
    /// and the append happen under one write lock.
    pub fn submit(&self, candidate: BlockRecord) -> Result<Arc<Block>> {
        let mut slot = self.head.write();
        check_candidate(&candidate, &slot)?;
        let block = Arc::new(Block::from_record(candidate, Some(slot.clone())));
        *slot = block.clone();
        info!(hash = %block.hash(), length = block.chain_length(), "chain.head.submit");
        Ok(block)
    }
}
