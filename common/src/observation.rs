//! Rate observations and resolved rates.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::Currency;
use crate::error::ValidationError;
use crate::time::Timestamp;

/// Where an observation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    /// Recorded manually through the local API.
    Local,
    /// Ingested from the external quote provider.
    External,
}

impl RateSource {
    /// Stable storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RateSource::Local => "local",
            RateSource::External => "external",
        }
    }

    /// Parse the storage representation, defaulting unknown values to Local.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "external" => RateSource::External,
            _ => RateSource::Local,
        }
    }
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable timestamped rate record for a currency pair.
///
/// The ledger only ever appends these; a correction is a newer observation,
/// not an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateObservation {
    /// Base currency of the pair.
    pub base: Currency,
    /// Quote currency of the pair.
    pub quote: Currency,
    /// Units of quote currency per one unit of base currency.
    pub rate: f64,
    /// When the rate was observed.
    pub observed_at: Timestamp,
    /// Origin of the observation.
    pub source: RateSource,
}

impl RateObservation {
    /// Create a new observation.
    pub fn new(
        base: Currency,
        quote: Currency,
        rate: f64,
        observed_at: Timestamp,
        source: RateSource,
    ) -> Self {
        Self {
            base,
            quote,
            rate,
            observed_at,
            source,
        }
    }

    /// Check the observation invariant: the rate is finite and positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(ValidationError::NonPositiveRate(self.rate));
        }
        Ok(())
    }
}

/// How a resolved rate was derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePath {
    /// A single observation for the requested pair.
    Direct,
    /// Composed from two observations through the pivot currency.
    ViaPivot(Currency),
}

impl fmt::Display for RatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatePath::Direct => write!(f, "direct"),
            RatePath::ViaPivot(pivot) => write!(f, "via {}", pivot),
        }
    }
}

/// The answer to "what is the best-known rate for this pair as of time T".
///
/// Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRate {
    /// Base currency of the request.
    pub base: Currency,
    /// Quote currency of the request.
    pub quote: Currency,
    /// Units of quote currency per one unit of base currency.
    pub rate: f64,
    /// Derivation path.
    pub path: RatePath,
    /// Timestamp of the observation(s) backing the rate. For a composed rate
    /// this is the earlier leg; the rate is only as fresh as its stalest leg.
    pub as_of: Timestamp,
}

impl ResolvedRate {
    /// The trivial resolution of a currency against itself.
    pub fn identity(currency: Currency, as_of: Timestamp) -> Self {
        Self {
            base: currency.clone(),
            quote: currency,
            rate: 1.0,
            path: RatePath::Direct,
            as_of,
        }
    }

    /// Resolution backed by a single observation.
    pub fn direct(observation: &RateObservation) -> Self {
        Self {
            base: observation.base.clone(),
            quote: observation.quote.clone(),
            rate: observation.rate,
            path: RatePath::Direct,
            as_of: observation.observed_at,
        }
    }

    /// Resolution composed through the pivot from two observations.
    pub fn via_pivot(
        base: Currency,
        quote: Currency,
        pivot: Currency,
        rate: f64,
        first_leg: Timestamp,
        second_leg: Timestamp,
    ) -> Self {
        Self {
            base,
            quote,
            rate,
            path: RatePath::ViaPivot(pivot),
            as_of: first_leg.min(second_leg),
        }
    }
}
