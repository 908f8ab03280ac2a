//! Mock quote provider for testing.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use parking_lot::Mutex;

use ratehub_common::Currency;

use crate::client::{FetchOutcome, HistoricalQuote, QuoteBatch, QuoteProvider};
use crate::error::{ProviderError, ProviderResult};

/// In-memory provider with scripted responses.
pub struct MockQuoteProvider {
    name: String,
    live: DashMap<String, QuoteBatch>,
    historical: DashMap<String, HistoricalQuote>,
    failure: Mutex<Option<String>>,
}

impl MockQuoteProvider {
    /// Create a new mock provider.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            live: DashMap::new(),
            historical: DashMap::new(),
            failure: Mutex::new(None),
        }
    }

    /// Script the live batch returned for the batch's base currency.
    pub fn set_live(&self, batch: QuoteBatch) {
        self.live.insert(batch.base.code().to_string(), batch);
    }

    /// Script a historical quote for a pair and date.
    pub fn set_historical(&self, date: NaiveDate, quote: HistoricalQuote) {
        let key = Self::historical_key(&quote.pair.base, &quote.pair.quote, date);
        self.historical.insert(key, quote);
    }

    /// Make every subsequent call fail with a transport error.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.lock() = Some(reason.into());
    }

    fn check_failure(&self) -> ProviderResult<()> {
        if let Some(reason) = self.failure.lock().clone() {
            return Err(ProviderError::Transport(reason));
        }
        Ok(())
    }

    fn historical_key(base: &Currency, quote: &Currency, date: NaiveDate) -> String {
        format!("{}{}@{}", base.code(), quote.code(), date)
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_live(&self, base: &Currency) -> ProviderResult<FetchOutcome<QuoteBatch>> {
        self.check_failure()?;
        Ok(self
            .live
            .get(base.code())
            .map(|batch| FetchOutcome::Success(batch.clone()))
            .unwrap_or(FetchOutcome::NoData))
    }

    async fn fetch_historical(
        &self,
        base: &Currency,
        quote: &Currency,
        date: NaiveDate,
    ) -> ProviderResult<FetchOutcome<HistoricalQuote>> {
        self.check_failure()?;
        let key = Self::historical_key(base, quote, date);
        Ok(self
            .historical
            .get(&key)
            .map(|quote| FetchOutcome::Success(quote.clone()))
            .unwrap_or(FetchOutcome::NoData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratehub_common::now;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_mock_live_round_trip() {
        let provider = MockQuoteProvider::new("test");
        let mut rates = BTreeMap::new();
        rates.insert(Currency::eur(), 0.92);
        provider.set_live(QuoteBatch {
            base: Currency::usd(),
            rates,
            observed_at: now(),
        });

        let outcome = provider.fetch_live(&Currency::usd()).await.unwrap();
        assert!(matches!(outcome, FetchOutcome::Success(_)));

        let missing = provider.fetch_live(&Currency::eur()).await.unwrap();
        assert_eq!(missing, FetchOutcome::NoData);
    }

    #[tokio::test]
    async fn test_mock_failure_mode() {
        let provider = MockQuoteProvider::new("test");
        provider.fail_with("connection refused");

        let result = provider.fetch_live(&Currency::usd()).await;
        assert!(matches!(result, Err(ProviderError::Transport(_))));
    }
}
