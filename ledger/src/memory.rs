//! In-process ledger backed by an append-only vector.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use ratehub_common::{Currency, RateObservation, Timestamp};

use crate::store::{LedgerError, RateLedger};

/// Append-only in-memory ledger.
///
/// Positional order of the backing vector is the insertion order, which is
/// what breaks `observed_at` ties in favor of the later insert.
#[derive(Default)]
pub struct MemoryLedger {
    rows: RwLock<Vec<RateObservation>>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of observations recorded.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Whether any observation has been recorded.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    fn matches(obs: &RateObservation, base: &Currency, quote: &Currency) -> bool {
        &obs.base == base && &obs.quote == quote
    }

    fn within(obs: &RateObservation, cutoff: Option<Timestamp>) -> bool {
        match cutoff {
            Some(c) => obs.observed_at <= c,
            None => true,
        }
    }
}

#[async_trait]
impl RateLedger for MemoryLedger {
    async fn append(&self, observation: RateObservation) -> Result<(), LedgerError> {
        observation.validate()?;

        debug!(
            base = %observation.base,
            quote = %observation.quote,
            rate = observation.rate,
            source = %observation.source,
            "Appending observation"
        );
        self.rows.write().push(observation);
        Ok(())
    }

    async fn latest_before(
        &self,
        base: &Currency,
        quote: &Currency,
        cutoff: Option<Timestamp>,
    ) -> Result<Option<RateObservation>, LedgerError> {
        let rows = self.rows.read();

        let mut best: Option<&RateObservation> = None;
        for obs in rows.iter() {
            if !Self::matches(obs, base, quote) || !Self::within(obs, cutoff) {
                continue;
            }
            // >= lets a later insert replace an equal timestamp.
            match best {
                Some(b) if obs.observed_at < b.observed_at => {}
                _ => best = Some(obs),
            }
        }

        Ok(best.cloned())
    }

    async fn all_latest_from(
        &self,
        base: &Currency,
        cutoff: Option<Timestamp>,
    ) -> Result<BTreeMap<Currency, RateObservation>, LedgerError> {
        let rows = self.rows.read();

        let mut latest: BTreeMap<Currency, RateObservation> = BTreeMap::new();
        for obs in rows.iter() {
            if &obs.base != base || !Self::within(obs, cutoff) {
                continue;
            }
            match latest.get(&obs.quote) {
                Some(existing) if obs.observed_at < existing.observed_at => {}
                _ => {
                    latest.insert(obs.quote.clone(), obs.clone());
                }
            }
        }

        Ok(latest)
    }

    async fn in_range(
        &self,
        base: &Currency,
        quote: &Currency,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<RateObservation>, LedgerError> {
        let rows = self.rows.read();

        let mut matching: Vec<RateObservation> = rows
            .iter()
            .filter(|obs| {
                Self::matches(obs, base, quote)
                    && obs.observed_at >= start
                    && obs.observed_at <= end
            })
            .cloned()
            .collect();
        // Stable sort keeps insertion order among equal timestamps.
        matching.sort_by_key(|obs| obs.observed_at);

        Ok(matching)
    }
}
