//! Quote provider trait and the HTTP implementation.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use tracing::{debug, instrument, warn};

use ratehub_common::{now, start_of_day, Currency, CurrencyPair, Timestamp};

use crate::error::{ProviderError, ProviderResult};
use crate::wire::{self, ApiEnvelope};

/// Outcome of a successful provider call.
///
/// `NoData` means the provider answered but had nothing usable for the
/// requested pair(s). Callers render it as "no rate available"; it is never a
/// failure.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    /// Usable data.
    Success(T),
    /// Successful call, nothing usable returned.
    NoData,
}

impl<T> FetchOutcome<T> {
    /// Convert to an `Option`, discarding the distinction.
    pub fn into_option(self) -> Option<T> {
        match self {
            FetchOutcome::Success(value) => Some(value),
            FetchOutcome::NoData => None,
        }
    }
}

/// A normalized batch of live quotes for one base currency.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteBatch {
    /// Base currency the quotes are against.
    pub base: Currency,
    /// Quote currency → rate.
    pub rates: BTreeMap<Currency, f64>,
    /// When the provider says the quotes were observed.
    pub observed_at: Timestamp,
}

/// A normalized historical quote for one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalQuote {
    /// The requested pair.
    pub pair: CurrencyPair,
    /// Units of quote currency per one unit of base currency.
    pub rate: f64,
    /// The historical date, as a timestamp.
    pub observed_at: Timestamp,
}

/// External quote source.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch current quotes for all pairs against `base`.
    async fn fetch_live(&self, base: &Currency) -> ProviderResult<FetchOutcome<QuoteBatch>>;

    /// Fetch the quote for one pair on a historical date.
    async fn fetch_historical(
        &self,
        base: &Currency,
        quote: &Currency,
        date: NaiveDate,
    ) -> ProviderResult<FetchOutcome<HistoricalQuote>>;
}

/// Configuration for the HTTP quote provider.
#[derive(Debug, Clone)]
pub struct ExchangeHostConfig {
    /// API base URL.
    pub base_url: String,
    /// Access key sent with every request, if the deployment has one.
    pub access_key: Option<String>,
    /// Hard timeout for each request.
    pub timeout: Duration,
}

impl Default for ExchangeHostConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.exchangerate.host".to_string(),
            access_key: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Adapter for the exchangerate.host-style quote API.
pub struct ExchangeHostProvider {
    config: ExchangeHostConfig,
    http: reqwest::Client,
}

impl ExchangeHostProvider {
    /// Build the adapter; the timeout is baked into the HTTP client.
    pub fn new(config: ExchangeHostConfig) -> ProviderResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self { config, http })
    }

    async fn request(&self, path: &str, params: &[(&str, String)]) -> ProviderResult<ApiEnvelope> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(key) = &self.config.access_key {
            query.push(("access_key", key.clone()));
        }
        query.extend(params.iter().cloned());

        debug!(url = %url, "Requesting quotes");
        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?;

        let envelope: ApiEnvelope = response.json().await?;

        // A success:false body is always a rejection, never "no data".
        if !envelope.success {
            let (code, info) = envelope
                .error
                .map(|e| (e.code, e.info))
                .unwrap_or((0, "provider reported failure without details".to_string()));
            return Err(ProviderError::Api { code, info });
        }

        Ok(envelope)
    }
}

#[async_trait]
impl QuoteProvider for ExchangeHostProvider {
    fn name(&self) -> &str {
        "exchangerate.host"
    }

    #[instrument(skip(self), fields(base = %base))]
    async fn fetch_live(&self, base: &Currency) -> ProviderResult<FetchOutcome<QuoteBatch>> {
        let envelope = self
            .request("live", &[("base", base.code().to_string())])
            .await?;

        let quotes = match envelope.quotes {
            Some(quotes) if !quotes.is_empty() => quotes,
            _ => return Ok(FetchOutcome::NoData),
        };

        let observed_at = envelope
            .timestamp
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(now);

        let mut rates = BTreeMap::new();
        for (key, rate) in quotes {
            let Some(quote) = wire::split_pair_key(&key, base) else {
                debug!(key = %key, "Skipping undecodable quote key");
                continue;
            };
            if !rate.is_finite() || rate <= 0.0 {
                warn!(key = %key, rate, "Skipping non-positive provider rate");
                continue;
            }
            rates.insert(quote, rate);
        }

        if rates.is_empty() {
            return Ok(FetchOutcome::NoData);
        }

        debug!(quotes = rates.len(), "Fetched live quotes");
        Ok(FetchOutcome::Success(QuoteBatch {
            base: base.clone(),
            rates,
            observed_at,
        }))
    }

    #[instrument(skip(self), fields(base = %base, quote = %quote, date = %date))]
    async fn fetch_historical(
        &self,
        base: &Currency,
        quote: &Currency,
        date: NaiveDate,
    ) -> ProviderResult<FetchOutcome<HistoricalQuote>> {
        let envelope = self
            .request(
                "historical",
                &[
                    ("date", date.to_string()),
                    ("base", base.code().to_string()),
                    ("symbols", quote.code().to_string()),
                ],
            )
            .await?;

        let key = format!("{}{}", base.code(), quote.code());
        let rate = envelope.quotes.as_ref().and_then(|q| q.get(&key)).copied();

        let rate = match rate {
            Some(rate) if rate.is_finite() && rate > 0.0 => rate,
            _ => return Ok(FetchOutcome::NoData),
        };

        let observed_at = start_of_day(envelope.date.unwrap_or(date));

        Ok(FetchOutcome::Success(HistoricalQuote {
            pair: CurrencyPair::new(base.clone(), quote.clone()),
            rate,
            observed_at,
        }))
    }
}
