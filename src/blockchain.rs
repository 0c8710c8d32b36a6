// Thin re-export module: the ledger data model lives in `blockchain/core`,
// split into chain structure, queries, consumer-side checks and the head slot.

pub mod core;
pub use self::core::*;
