//! Bulk ingestion of provider quotes into the ledger.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use ratehub_common::{Currency, CurrencyRegistry, RateObservation, RateSource, Timestamp};
use ratehub_ledger::RateLedger;

use crate::error::ServiceError;

/// Outcome of one ingestion pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Observations appended to the ledger.
    pub appended: usize,
    /// Quotes skipped: unknown currency, the pivot itself, or an unusable rate.
    pub skipped: usize,
}

/// Writes provider quote batches into the ledger, one observation per known
/// quote currency. This is the only write path driven by the external source.
pub struct RateIngestor {
    ledger: Arc<dyn RateLedger>,
    registry: Arc<CurrencyRegistry>,
    pivot: Currency,
}

impl RateIngestor {
    /// Create an ingestor appending pivot-based observations.
    pub fn new(
        ledger: Arc<dyn RateLedger>,
        registry: Arc<CurrencyRegistry>,
        pivot: Currency,
    ) -> Self {
        Self {
            ledger,
            registry,
            pivot,
        }
    }

    /// Append one `pivot → quote` observation per usable entry.
    ///
    /// Quote currencies outside the reference set are skipped, as are
    /// non-positive rates; neither aborts the pass.
    #[instrument(skip(self, rates), fields(quotes = rates.len()))]
    pub async fn ingest(
        &self,
        rates: &BTreeMap<Currency, f64>,
        observed_at: Timestamp,
    ) -> Result<IngestReport, ServiceError> {
        let mut report = IngestReport {
            appended: 0,
            skipped: 0,
        };

        for (quote, rate) in rates {
            if quote == &self.pivot || !self.registry.contains(quote) {
                report.skipped += 1;
                continue;
            }
            if !rate.is_finite() || *rate <= 0.0 {
                warn!(quote = %quote, rate, "Skipping unusable provider rate");
                report.skipped += 1;
                continue;
            }

            self.ledger
                .append(RateObservation::new(
                    self.pivot.clone(),
                    quote.clone(),
                    *rate,
                    observed_at,
                    RateSource::External,
                ))
                .await?;
            report.appended += 1;
        }

        info!(
            appended = report.appended,
            skipped = report.skipped,
            "Ingested provider quotes"
        );
        Ok(report)
    }
}
