//! Integration tests for building, exporting and querying a chain

use hashledger::blockchain::{verify_chain, Block, BlockHeader, BlockRecord, ChainHead, GenesisScan};
use hashledger::error::LedgerError;
use hashledger::mempool::Mempool;
use hashledger::transaction::{validate_funds, Transaction, TxInput, TxOutput};
use std::sync::Arc;
use tempfile::TempDir;

const ALICE_SCRIPT: &str = "OP_DUP OP_HASH160 alice OP_EQUAL_VERIFY OP_CHECKSIG";
const BOB_SCRIPT: &str = "OP_DUP OP_HASH160 bob OP_EQUAL_VERIFY OP_CHECKSIG";

/// Genesis pays alice 100; block 2 moves 60 of it to bob; block 3 is empty.
fn three_block_chain() -> (ChainHead, String) {
    let genesis = Block::new(
        vec![Transaction::new(vec![], vec![TxOutput::new(100, ALICE_SCRIPT)])],
        BlockHeader::new("", 1672531200.0, 0, "genesis"),
        None,
    );
    let coinbase = genesis.transactions()[0].transaction_hash.clone();
    let chain = ChainHead::new(genesis);

    let spend = Transaction::new(
        vec![TxInput::new(coinbase.clone(), 0, "sig alice")],
        vec![TxOutput::new(60, BOB_SCRIPT), TxOutput::new(40, ALICE_SCRIPT)],
    );
    let prev = chain.head().hash().to_string();
    chain.append(vec![spend], BlockHeader::new(prev, 1672531260.0, 1, "m2"));

    let prev = chain.head().hash().to_string();
    chain.append(vec![], BlockHeader::new(prev, 1672531320.5, 2, "m3"));

    (chain, coinbase)
}

#[test]
fn test_chain_export_roundtrip_through_file() -> Result<(), Box<dyn std::error::Error>> {
    let (chain, _) = three_block_chain();
    let head = chain.head();
    assert_eq!(head.chain_length(), 3);

    let dir = TempDir::new()?;
    let path = dir.path().join("chain.json");
    std::fs::write(&path, head.chain_to_json()?)?;

    let records: Vec<BlockRecord> = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].header.hash, head.hash());
    assert!(records[2].header.previous_block_hash.is_empty());

    let restored = Block::from_chain_export(records)?;
    assert_eq!(restored.chain_length(), 3);
    assert_eq!(*restored, *head);
    assert_eq!(restored.to_chain_export(), head.to_chain_export());
    verify_chain(&restored)?;
    Ok(())
}

#[test]
fn test_empty_export_is_rejected() {
    assert!(matches!(Block::from_chain_export(vec![]), Err(LedgerError::EmptyChain)));
}

#[test]
fn test_queries_across_the_chain() {
    let (chain, coinbase) = three_block_chain();
    let head = chain.head();

    assert!(head.find_transaction(&coinbase).is_some());
    assert!(head.find_transaction_with(&coinbase, GenesisScan::Exclusive).is_none());
    assert!(head.find_transaction("no-such-hash").is_none());

    // Gross receipts: nothing is subtracted for the spent genesis output.
    assert_eq!(head.gross_receipts("alice").total, 140);
    assert_eq!(head.gross_receipts_with("alice", GenesisScan::Exclusive).total, 40);
    assert_eq!(head.gross_receipts("bob").total, 60);
    assert_eq!(head.gross_receipts("bob").utxos.len(), 1);
    assert_eq!(head.gross_receipts("carol").total, 0);
}

#[test]
fn test_forks_share_history() {
    let (chain, _) = three_block_chain();
    let tip = chain.head();
    let parent = tip.previous().cloned().expect("tip has a predecessor");

    let fork = Block::new(vec![], BlockHeader::new(parent.hash(), 1672531999.0, 9, "fork"), Some(parent.clone()));
    assert_eq!(fork.chain_length(), 3);
    assert!(Arc::ptr_eq(fork.previous().unwrap(), tip.previous().unwrap()));
    assert_ne!(fork.hash(), tip.hash());
}

#[test]
fn test_submit_then_admit_against_new_head() -> Result<(), Box<dyn std::error::Error>> {
    let (chain, coinbase) = three_block_chain();

    // Double spends are not detected; only existence and balance are checked.
    let respend = Transaction::new(
        vec![TxInput::new(coinbase.clone(), 0, "sig alice")],
        vec![TxOutput::new(100, BOB_SCRIPT)],
    );
    validate_funds(&chain.head(), &respend)?;

    let mut mempool = Mempool::new();
    let hash = mempool.add(respend.clone())?;
    assert_eq!(hash, respend.compute_hash());

    let header = BlockHeader::new(chain.head().hash(), 1672532000.0, 3, "m4");
    let block = chain.submit(BlockRecord {
        header,
        transactions: mempool.drain(),
    })?;
    assert_eq!(block.chain_length(), 4);
    assert!(chain.head().find_transaction(&hash).is_some());

    let stale = BlockHeader::new(block.previous().unwrap().hash(), 1672532001.0, 4, "stale");
    let result = chain.submit(BlockRecord {
        header: stale,
        transactions: vec![],
    });
    assert!(matches!(result, Err(LedgerError::InvalidBlockLinkage { .. })));
    assert_eq!(chain.head().chain_length(), 4);
    Ok(())
}

#[test]
fn test_tampered_export_fails_verification() -> Result<(), Box<dyn std::error::Error>> {
    let (chain, _) = three_block_chain();
    let mut records = chain.head().to_chain_export();
    records[1].header.nonce += 1;

    let restored = Block::from_chain_export(records)?;
    assert!(matches!(verify_chain(&restored), Err(LedgerError::HashMismatch { .. })));
    Ok(())
}
