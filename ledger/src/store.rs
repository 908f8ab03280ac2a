//! The ledger contract.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use ratehub_common::{Currency, RateObservation, Timestamp, ValidationError};

/// Errors from ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The observation failed validation at the ledger boundary.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The underlying store is unavailable or misbehaving. Fatal for the
    /// current request; never retried internally.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

/// Append-only store of `(base, quote, rate, observed_at)` tuples.
///
/// Observations are pair-directional: a row for `(A, B)` says nothing about
/// `(B, A)`, and no implementation may derive inverses.
#[async_trait]
pub trait RateLedger: Send + Sync {
    /// Append one observation. Rejects non-positive or non-finite rates.
    async fn append(&self, observation: RateObservation) -> Result<(), LedgerError>;

    /// The most recent observation for the pair at or before `cutoff`
    /// (`None` = most recent ever). Ties on `observed_at` are broken by
    /// insertion order: the later insert wins, which is how a manual
    /// correction supersedes an automatic one recorded at the same instant.
    async fn latest_before(
        &self,
        base: &Currency,
        quote: &Currency,
        cutoff: Option<Timestamp>,
    ) -> Result<Option<RateObservation>, LedgerError>;

    /// For each quote currency observed against `base`, the single most
    /// recent observation at or before `cutoff`. One pass over the store;
    /// at most one row per quote currency.
    async fn all_latest_from(
        &self,
        base: &Currency,
        cutoff: Option<Timestamp>,
    ) -> Result<BTreeMap<Currency, RateObservation>, LedgerError>;

    /// All observations for the pair within `[start, end]`, ascending by
    /// observation time.
    async fn in_range(
        &self,
        base: &Currency,
        quote: &Currency,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<RateObservation>, LedgerError>;
}
