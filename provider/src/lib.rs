//! RateHub Quote Provider Adapter
//!
//! Normalizes the external quote provider's live and historical responses
//! into a stable internal shape, and classifies every call into exactly three
//! outcomes: usable data, a successful-but-empty answer, or a failure.
//!
//! The provider keys its quotes by concatenated pair (`"USDILS"`); the
//! [`wire`] module owns decoding that format in one place.

pub mod client;
pub mod error;
pub mod wire;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use client::{
    ExchangeHostConfig, ExchangeHostProvider, FetchOutcome, HistoricalQuote, QuoteBatch,
    QuoteProvider,
};
pub use error::ProviderError;
