//! Wire shapes of the upstream quote API.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

use ratehub_common::Currency;

/// Envelope common to the `/live` and `/historical` endpoints.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: bool,
    /// Unix timestamp of the quotes (live endpoint).
    #[serde(default)]
    pub timestamp: Option<i64>,
    /// Quote date (historical endpoint).
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Pair-concatenated quote map, e.g. `{"USDILS": 3.65}`.
    #[serde(default)]
    pub quotes: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub error: Option<ApiFailure>,
}

/// Error block returned with `success: false`.
#[derive(Debug, Deserialize)]
pub struct ApiFailure {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub info: String,
}

/// Decode a pair-concatenated quote key (`"USDILS"`) against a known base.
///
/// Returns the quote currency, or `None` when the key does not start with the
/// base or the remainder is not a currency code.
pub fn split_pair_key(key: &str, base: &Currency) -> Option<Currency> {
    let rest = key.strip_prefix(base.code())?;
    Currency::parse(rest).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pair_key() {
        let base = Currency::usd();

        assert_eq!(split_pair_key("USDILS", &base), Some(Currency::ils()));
        assert_eq!(split_pair_key("USDEUR", &base), Some(Currency::eur()));
    }

    #[test]
    fn test_split_pair_key_rejects_foreign_base() {
        assert_eq!(split_pair_key("EURILS", &Currency::usd()), None);
    }

    #[test]
    fn test_split_pair_key_rejects_malformed_remainder() {
        let base = Currency::usd();

        assert_eq!(split_pair_key("USD", &base), None);
        assert_eq!(split_pair_key("USDX", &base), None);
        assert_eq!(split_pair_key("USDEURX", &base), None);
        assert_eq!(split_pair_key("USD123", &base), None);
    }

    #[test]
    fn test_envelope_tolerates_missing_fields() {
        let envelope: ApiEnvelope = serde_json::from_str(r#"{"success": true}"#).unwrap();

        assert!(envelope.success);
        assert!(envelope.quotes.is_none());
        assert!(envelope.error.is_none());
    }

    #[test]
    fn test_envelope_parses_failure_block() {
        let body = r#"{"success": false, "error": {"code": 101, "info": "missing access key"}}"#;
        let envelope: ApiEnvelope = serde_json::from_str(body).unwrap();

        assert!(!envelope.success);
        let failure = envelope.error.unwrap();
        assert_eq!(failure.code, 101);
        assert_eq!(failure.info, "missing access key");
    }
}
