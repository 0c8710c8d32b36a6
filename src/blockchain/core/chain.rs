use crate::error::{LedgerError, Result};
use crate::hashing::{self, Layout};
use crate::numeric::Numeric;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Block metadata plus its content hash.
///
/// The structured form (and the JSON text from [`BlockHeader::to_json`]) keeps
/// the field order `previous_block_hash, merkle_root, timestamp, nonce, hash`.
/// The content hash is taken over the same shape without `hash`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "HeaderRecord")]
pub struct BlockHeader {
    pub previous_block_hash: String,
    /// Commitment over the block's transactions, supplied by whoever builds
    /// the block; this crate never computes it.
    pub merkle_root: String,
    /// Seconds since the epoch, fractional allowed. Integer and float forms
    /// hash differently.
    pub timestamp: Numeric,
    pub nonce: u64,
    pub hash: String,
}

#[derive(Serialize)]
struct HeaderContent<'a> {
    previous_block_hash: &'a str,
    merkle_root: &'a str,
    timestamp: Numeric,
    nonce: u64,
}

#[derive(Deserialize)]
struct HeaderRecord {
    previous_block_hash: String,
    merkle_root: String,
    timestamp: Numeric,
    nonce: u64,
    #[serde(default)]
    hash: String,
}

impl From<HeaderRecord> for BlockHeader {
    fn from(r: HeaderRecord) -> Self {
        BlockHeader::with_hash(r.previous_block_hash, r.timestamp, r.nonce, r.merkle_root, r.hash)
    }
}

impl BlockHeader {
    /// Builds a header and computes its hash.
    pub fn new(
        previous_block_hash: impl Into<String>,
        timestamp: impl Into<Numeric>,
        nonce: u64,
        merkle_root: impl Into<String>,
    ) -> Self {
        Self::with_hash(previous_block_hash, timestamp, nonce, merkle_root, String::new())
    }

    /// Builds a header with a caller-supplied hash. The hash is stored as-is;
    /// only an empty hash is replaced by the computed one.
    pub fn with_hash(
        previous_block_hash: impl Into<String>,
        timestamp: impl Into<Numeric>,
        nonce: u64,
        merkle_root: impl Into<String>,
        hash: impl Into<String>,
    ) -> Self {
        let mut header = BlockHeader {
            previous_block_hash: previous_block_hash.into(),
            merkle_root: merkle_root.into(),
            timestamp: timestamp.into(),
            nonce,
            hash: hash.into(),
        };
        if header.hash.is_empty() {
            header.hash = header.content_hash();
        }
        header
    }

    /// Deterministic hash of `previous_block_hash`, `merkle_root`, `timestamp`
    /// and `nonce`.
    pub fn content_hash(&self) -> String {
        let content = HeaderContent {
            previous_block_hash: &self.previous_block_hash,
            merkle_root: &self.merkle_root,
            timestamp: self.timestamp,
            nonce: self.nonce,
        };
        hashing::digest(&content, Layout::Spaced).expect("header content is plain strings and numbers")
    }

    pub fn to_json(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = hashing::to_canonical_string(self, Layout::Spaced).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// One block of a chain as it appears in an export: header and transactions,
/// without the link to the predecessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

/// A node of a backward-linked chain.
///
/// Predecessors are shared (`Arc`), so several heads can grow from the same
/// history. Blocks are immutable once built.
#[derive(Debug, Clone)]
pub struct Block {
    header: BlockHeader,
    transactions: Vec<Transaction>,
    previous: Option<Arc<Block>>,
}

impl Block {
    /// Attaches `transactions` to a block, stamping each with its computed
    /// `transaction_hash` (any stored value is overwritten).
    pub fn new(mut transactions: Vec<Transaction>, header: BlockHeader, previous: Option<Arc<Block>>) -> Self {
        for tx in transactions.iter_mut() {
            tx.transaction_hash = tx.compute_hash();
        }
        debug!(
            hash = %header.hash,
            transactions = transactions.len(),
            genesis = previous.is_none(),
            "block.new"
        );
        Block {
            header,
            transactions,
            previous,
        }
    }

    /// Like [`Block::new`] but for dynamically shaped records. The first record
    /// missing `inputs` or `outputs` (or carrying mistyped fields) fails the
    /// whole construction.
    pub fn from_records(records: Vec<Value>, header: BlockHeader, previous: Option<Arc<Block>>) -> Result<Self> {
        let transactions = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| Transaction::from_record(index, record))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(transactions, header, previous))
    }

    pub fn from_record(record: BlockRecord, previous: Option<Arc<Block>>) -> Self {
        Self::new(record.transactions, record.header, previous)
    }

    /// Rebuilds a chain from a head-first export and returns its head.
    pub fn from_chain_export(records: Vec<BlockRecord>) -> Result<Arc<Block>> {
        let mut head: Option<Arc<Block>> = None;
        for record in records.into_iter().rev() {
            head = Some(Arc::new(Self::from_record(record, head.take())));
        }
        head.ok_or(LedgerError::EmptyChain)
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn hash(&self) -> &str {
        &self.header.hash
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn previous(&self) -> Option<&Arc<Block>> {
        self.previous.as_ref()
    }

    pub fn is_genesis(&self) -> bool {
        self.previous.is_none()
    }

    /// This block followed by each predecessor down to genesis.
    pub fn iter(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Number of blocks from here back to genesis, both included.
    pub fn chain_length(&self) -> usize {
        self.iter().count()
    }

    pub fn to_record(&self) -> BlockRecord {
        BlockRecord {
            header: self.header.clone(),
            transactions: self.transactions.clone(),
        }
    }

    /// Snapshot of every block from here back to genesis, head first.
    pub fn to_chain_export(&self) -> Vec<BlockRecord> {
        self.iter().map(Block::to_record).collect()
    }

    pub fn chain_to_json(&self) -> Result<String> {
        hashing::to_canonical_string(&self.to_chain_export(), Layout::Spaced)
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && self.transactions == other.transactions
    }
}

#[derive(Serialize)]
struct BlockSummary<'a> {
    timestamp: Numeric,
    hash: &'a str,
    transactions: &'a [Transaction],
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let summary = BlockSummary {
            timestamp: self.header.timestamp,
            hash: &self.header.hash,
            transactions: &self.transactions,
        };
        let text = hashing::to_canonical_string(&summary, Layout::Spaced).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

// Unlink predecessors one at a time so dropping a long chain does not recurse.
impl Drop for Block {
    fn drop(&mut self) {
        let mut next = self.previous.take();
        while let Some(block) = next {
            match Arc::try_unwrap(block) {
                Ok(mut inner) => next = inner.previous.take(),
                Err(_) => break,
            }
        }
    }
}

pub struct Ancestors<'a> {
    next: Option<&'a Block>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.previous.as_deref();
        Some(current)
    }
}
