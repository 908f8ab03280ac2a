//! Currency identifiers and the currency reference set.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::ValidationError;

/// ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from a trusted code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Parse an untrusted code, validating its shape (three ASCII letters).
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::MalformedCurrency(code.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Common currencies
    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn ils() -> Self {
        Self::new("ILS")
    }

    pub fn gbp() -> Self {
        Self::new("GBP")
    }

    pub fn jpy() -> Self {
        Self::new("JPY")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A currency pair for rate operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Base currency (the one being priced).
    pub base: Currency,
    /// Quote currency (the pricing currency).
    pub quote: Currency,
}

impl CurrencyPair {
    /// Create a new currency pair.
    pub fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// One entry of the currency reference set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    /// Currency code.
    pub code: Currency,
    /// Human-readable display name.
    pub name: String,
}

impl CurrencyInfo {
    /// Create a new reference entry.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: Currency::new(code),
            name: name.into(),
        }
    }
}

/// The currency reference set, loaded once at startup.
///
/// A code outside the set is an invalid-input error, never a missing-rate
/// outcome.
#[derive(Debug, Clone)]
pub struct CurrencyRegistry {
    entries: Vec<CurrencyInfo>,
    index: HashSet<Currency>,
}

impl CurrencyRegistry {
    /// Build a registry from ordered reference entries.
    pub fn new(entries: Vec<CurrencyInfo>) -> Self {
        let index = entries.iter().map(|e| e.code.clone()).collect();
        Self { entries, index }
    }

    /// The built-in default reference set.
    pub fn builtin() -> Self {
        Self::new(vec![
            CurrencyInfo::new("USD", "US Dollar"),
            CurrencyInfo::new("EUR", "Euro"),
            CurrencyInfo::new("ILS", "Israeli Shekel"),
            CurrencyInfo::new("GBP", "British Pound"),
            CurrencyInfo::new("JPY", "Japanese Yen"),
            CurrencyInfo::new("AUD", "Australian Dollar"),
            CurrencyInfo::new("CAD", "Canadian Dollar"),
            CurrencyInfo::new("CHF", "Swiss Franc"),
            CurrencyInfo::new("CNY", "Chinese Yuan"),
            CurrencyInfo::new("RUB", "Russian Ruble"),
        ])
    }

    /// Ordered reference entries.
    pub fn entries(&self) -> &[CurrencyInfo] {
        &self.entries
    }

    /// Check membership of a currency.
    pub fn contains(&self, currency: &Currency) -> bool {
        self.index.contains(currency)
    }

    /// Parse an untrusted code and require membership in the set.
    pub fn require(&self, code: &str) -> Result<Currency, ValidationError> {
        let currency = Currency::parse(code)?;
        if !self.contains(&currency) {
            return Err(ValidationError::UnknownCurrency(currency));
        }
        Ok(currency)
    }

    /// Number of known currencies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
