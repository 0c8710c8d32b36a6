//! hashledger - A hash-linked ledger of blocks carrying UTXO-style transactions
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, chain traversal, queries and linkage checks
//! - [`transaction`] - Transaction records and funds admission
//! - [`mempool`] - Pool of admitted transactions
//! - [`hashing`] - Canonical JSON text and SHA-256 digests
//! - [`numeric`] - JSON numbers that keep their integer or float form
//!
//! ## Integration
//! - [`api`] - REST API (feature `api`)
//! - [`node`] - Node bootstrap (feature `api`)
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod hashing;
pub mod mempool;
pub mod numeric;
pub mod transaction;

// ============================================================================
// Integration
// ============================================================================
#[cfg(feature = "api")]
pub mod api;
#[cfg(feature = "api")]
pub mod node;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
