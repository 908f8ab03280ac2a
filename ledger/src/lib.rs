//! RateHub Rate Ledger
//!
//! Append-only store of pairwise rate observations. History is never mutated:
//! a correction is a newer observation for the same pair, which supersedes
//! older ones by recency.
//!
//! Two implementations are provided: [`MemoryLedger`] for tests and
//! embedding, and [`SqliteLedger`] backed by sqlx for the production store.

pub mod memory;
pub mod sqlite;
pub mod store;

pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;
pub use store::{LedgerError, RateLedger};
