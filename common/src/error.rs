//! Validation errors shared across the RateHub workspace.

use thiserror::Error;

use crate::currency::Currency;
use crate::time::Timestamp;

/// Input validation failures, rejected before any I/O and never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Code does not look like a currency code at all.
    #[error("Malformed currency code: {0:?}")]
    MalformedCurrency(String),

    /// Code is well-formed but outside the currency reference set.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(Currency),

    /// Observed rates must be finite and strictly positive.
    #[error("Rate must be a positive finite number, got {0}")]
    NonPositiveRate(f64),

    /// Conversion amounts must be finite and non-negative.
    #[error("Amount must be a non-negative finite number, got {0}")]
    InvalidAmount(f64),

    /// A history query with its bounds reversed.
    #[error("Range start {start} is after end {end}")]
    InvertedRange { start: Timestamp, end: Timestamp },
}
