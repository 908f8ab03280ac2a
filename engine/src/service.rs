//! The conversion façade used by the HTTP layer.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use ratehub_common::{
    now, Currency, CurrencyInfo, CurrencyRegistry, RateObservation, RateSource, ResolvedRate,
    Timestamp, ValidationError,
};
use ratehub_ledger::RateLedger;

use crate::error::ServiceError;
use crate::resolver::RateResolver;
use crate::table::TableSynthesizer;

/// A completed conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    /// Unique conversion ID.
    pub id: Uuid,
    /// Source currency.
    pub base: Currency,
    /// Target currency.
    pub quote: Currency,
    /// Input amount.
    pub amount: f64,
    /// Output amount, `amount * rate`.
    pub converted_amount: f64,
    /// The rate backing the conversion.
    pub resolved: ResolvedRate,
}

/// Validates inputs against the currency reference set and maps resolution
/// outcomes for the HTTP layer. `Ok(None)` is the "no rate data" outcome and
/// must never be reported as a server failure.
pub struct ConversionService {
    registry: Arc<CurrencyRegistry>,
    resolver: RateResolver,
    tables: TableSynthesizer,
    ledger: Arc<dyn RateLedger>,
}

impl ConversionService {
    /// Create the façade over a ledger, reference set, and pivot currency.
    pub fn new(
        ledger: Arc<dyn RateLedger>,
        registry: Arc<CurrencyRegistry>,
        pivot: Currency,
    ) -> Self {
        Self {
            registry,
            resolver: RateResolver::new(ledger.clone(), pivot.clone()),
            tables: TableSynthesizer::new(ledger.clone(), pivot),
            ledger,
        }
    }

    /// The currency reference set, in display order.
    pub fn currencies(&self) -> &[CurrencyInfo] {
        self.registry.entries()
    }

    /// Resolve the rate for a pair without converting an amount.
    pub async fn lookup(
        &self,
        base: &str,
        quote: &str,
        cutoff: Option<Timestamp>,
    ) -> Result<Option<ResolvedRate>, ServiceError> {
        let base = self.registry.require(base)?;
        let quote = self.registry.require(quote)?;
        Ok(self.resolver.resolve(&base, &quote, cutoff).await?)
    }

    /// Convert an amount between two currencies.
    #[instrument(skip(self))]
    pub async fn convert(
        &self,
        base: &str,
        quote: &str,
        amount: f64,
        cutoff: Option<Timestamp>,
    ) -> Result<Option<Conversion>, ServiceError> {
        let base = self.registry.require(base)?;
        let quote = self.registry.require(quote)?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(ValidationError::InvalidAmount(amount).into());
        }

        let resolved = match self.resolver.resolve(&base, &quote, cutoff).await? {
            Some(resolved) => resolved,
            None => return Ok(None),
        };

        let conversion = Conversion {
            id: Uuid::now_v7(),
            base,
            quote,
            amount,
            converted_amount: amount * resolved.rate,
            resolved,
        };

        info!(
            conversion_id = %conversion.id,
            rate = conversion.resolved.rate,
            path = %conversion.resolved.path,
            "Conversion completed"
        );
        Ok(Some(conversion))
    }

    /// Full conversion table for a base currency.
    pub async fn table(
        &self,
        base: &str,
        cutoff: Option<Timestamp>,
    ) -> Result<BTreeMap<Currency, f64>, ServiceError> {
        let base = self.registry.require(base)?;
        Ok(self.tables.all_rates(&base, cutoff).await?)
    }

    /// Recorded observations for a pair within a time range, ascending.
    pub async fn history(
        &self,
        base: &str,
        quote: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<RateObservation>, ServiceError> {
        let base = self.registry.require(base)?;
        let quote = self.registry.require(quote)?;
        if start > end {
            return Err(ValidationError::InvertedRange { start, end }.into());
        }
        Ok(self.ledger.in_range(&base, &quote, start, end).await?)
    }

    /// Record a manual rate correction.
    ///
    /// Appends a fresh observation stamped with the current time; prior
    /// observations are never touched. Recency is what makes the new value
    /// authoritative.
    #[instrument(skip(self))]
    pub async fn record_manual_rate(
        &self,
        base: &str,
        quote: &str,
        rate: f64,
    ) -> Result<RateObservation, ServiceError> {
        let base = self.registry.require(base)?;
        let quote = self.registry.require(quote)?;

        let observation = RateObservation::new(base, quote, rate, now(), RateSource::Local);
        self.ledger.append(observation.clone()).await?;

        info!(
            base = %observation.base,
            quote = %observation.quote,
            rate = observation.rate,
            "Recorded manual rate"
        );
        Ok(observation)
    }
}
