use super::chain::{Block, BlockHeader, BlockRecord};
use crate::error::{LedgerError, Result};

impl BlockHeader {
    /// Recomputes the content hash and compares it with the stored one.
    /// Construction never does this; supplied hashes are trusted until checked.
    pub fn verify_hash(&self) -> Result<()> {
        let expected = self.content_hash();
        if expected != self.hash {
            return Err(LedgerError::HashMismatch {
                expected,
                found: self.hash.clone(),
            });
        }
        Ok(())
    }
}

/// Checks a candidate block before it becomes the successor of `head`.
pub fn check_candidate(candidate: &BlockRecord, head: &Block) -> Result<()> {
    candidate.header.verify_hash()?;

    if candidate.header == *head.header() && candidate.transactions == head.transactions() {
        return Err(LedgerError::BlockAlreadyExists);
    }

    if candidate.header.previous_block_hash != head.hash() {
        return Err(LedgerError::InvalidBlockLinkage {
            expected: head.hash().to_string(),
            found: candidate.header.previous_block_hash.clone(),
        });
    }
    Ok(())
}

/// Checks every header hash from `head` back to genesis and that each block
/// names its predecessor's hash. The genesis block's own
/// `previous_block_hash` is not checked.
pub fn verify_chain(head: &Block) -> Result<()> {
    for block in head.iter() {
        block.header().verify_hash()?;
        if let Some(previous) = block.previous() {
            if block.header().previous_block_hash != previous.hash() {
                return Err(LedgerError::InvalidBlockLinkage {
                    expected: previous.hash().to_string(),
                    found: block.header().previous_block_hash.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{Transaction, TxOutput};
    use std::sync::Arc;

    fn genesis() -> Arc<Block> {
        Arc::new(Block::new(
            vec![Transaction::new(vec![], vec![TxOutput::new(10, "alice")])],
            BlockHeader::new("", 1.0, 0, "g"),
            None,
        ))
    }

    fn candidate_on(head: &Block) -> BlockRecord {
        BlockRecord {
            header: BlockHeader::new(head.hash(), 2.0, 1, "c"),
            transactions: vec![Transaction::new(vec![], vec![TxOutput::new(3, "bob")])],
        }
    }

    #[test]
    fn test_verify_hash_accepts_computed_hash() {
        assert!(BlockHeader::new("p", 1.0, 0, "m").verify_hash().is_ok());
    }

    #[test]
    fn test_verify_hash_reports_mismatch() {
        let header = BlockHeader::with_hash("p", 1.0, 0, "m", "bogus");
        match header.verify_hash() {
            Err(LedgerError::HashMismatch { expected, found }) => {
                assert_eq!(found, "bogus");
                assert_eq!(expected, header.content_hash());
            }
            other => panic!("Expected HashMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_candidate_accepted() {
        let head = genesis();
        assert!(check_candidate(&candidate_on(&head), &head).is_ok());
    }

    #[test]
    fn test_candidate_with_forged_hash_rejected() {
        let head = genesis();
        let mut candidate = candidate_on(&head);
        candidate.header.hash = "0000".to_string();
        assert!(matches!(
            check_candidate(&candidate, &head),
            Err(LedgerError::HashMismatch { .. })
        ));
    }

    #[test]
    fn test_candidate_on_wrong_parent_rejected() {
        let head = genesis();
        let candidate = BlockRecord {
            header: BlockHeader::new("elsewhere", 2.0, 1, "c"),
            transactions: vec![],
        };
        assert!(matches!(
            check_candidate(&candidate, &head),
            Err(LedgerError::InvalidBlockLinkage { .. })
        ));
    }

    #[test]
    fn test_duplicate_of_head_rejected() {
        let head = genesis();
        assert_eq!(
            check_candidate(&head.to_record(), &head),
            Err(LedgerError::BlockAlreadyExists)
        );
    }

    #[test]
    fn test_verify_chain() {
        let g = genesis();
        let record = candidate_on(&g);
        let tip = Block::from_record(record, Some(g));
        assert!(verify_chain(&tip).is_ok());
    }

    #[test]
    fn test_verify_chain_detects_broken_link() {
        let g = genesis();
        let stray = Block::new(vec![], BlockHeader::new("not-genesis", 2.0, 0, "s"), Some(g));
        assert!(matches!(
            verify_chain(&stray),
            Err(LedgerError::InvalidBlockLinkage { .. })
        ));
    }

    #[test]
    fn test_verify_chain_detects_forged_ancestor() {
        let forged = Arc::new(Block::new(vec![], BlockHeader::with_hash("", 1.0, 0, "g", "abc"), None));
        let tip = Block::new(vec![], BlockHeader::new("abc", 2.0, 0, "t"), Some(forged));
        assert!(matches!(verify_chain(&tip), Err(LedgerError::HashMismatch { .. })));
    }
}
