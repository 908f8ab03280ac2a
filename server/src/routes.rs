//! Route wiring.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{self, AppState};

/// Build the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/currencies", get(handlers::get_currencies))
        .route("/api/convert-currency", post(handlers::convert_currency))
        .route(
            "/api/exchange-rate",
            get(handlers::get_exchange_rate).put(handlers::update_exchange_rate),
        )
        .route("/api/db-exchange-rates", get(handlers::get_db_rates))
        .route("/api/historical-rates", get(handlers::get_historical_rates))
        .route(
            "/api/external-exchange-rate",
            get(handlers::get_external_rate),
        )
        .route(
            "/api/external-exchange-rates",
            get(handlers::get_external_rates),
        )
        .route("/api/fetch-latest-rates", post(handlers::fetch_latest_rates))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use ratehub_common::{now, Currency, CurrencyRegistry, RateObservation, RateSource};
    use ratehub_engine::{ConversionService, RateIngestor};
    use ratehub_ledger::{MemoryLedger, RateLedger};
    use ratehub_provider::mock::MockQuoteProvider;
    use ratehub_provider::QuoteBatch;

    struct Harness {
        app: Router,
        ledger: Arc<MemoryLedger>,
        provider: Arc<MockQuoteProvider>,
    }

    fn harness() -> Harness {
        let ledger = Arc::new(MemoryLedger::new());
        let registry = Arc::new(CurrencyRegistry::builtin());
        let provider = Arc::new(MockQuoteProvider::new("mock"));
        let pivot = Currency::usd();

        let shared: Arc<dyn RateLedger> = ledger.clone();
        let state = AppState {
            service: Arc::new(ConversionService::new(
                shared.clone(),
                registry.clone(),
                pivot.clone(),
            )),
            ingestor: Arc::new(RateIngestor::new(shared, registry.clone(), pivot.clone())),
            provider: provider.clone(),
            registry,
            pivot,
        };

        Harness {
            app: create_router(state),
            ledger,
            provider,
        }
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn seed(ledger: &MemoryLedger, base: &str, quote: &str, rate: f64) {
        ledger
            .append(RateObservation::new(
                Currency::new(base),
                Currency::new(quote),
                rate,
                now(),
                RateSource::External,
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_currencies() {
        let h = harness();

        let (status, body) = get(&h.app, "/api/currencies").await;

        assert_eq!(status, StatusCode::OK);
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 10);
        assert_eq!(list[0]["code"], "USD");
        assert_eq!(list[0]["name"], "US Dollar");
    }

    #[tokio::test]
    async fn test_convert_currency_direct() {
        let h = harness();
        seed(&h.ledger, "USD", "EUR", 0.90).await;

        let (status, body) = send_json(
            &h.app,
            "POST",
            "/api/convert-currency",
            json!({"sourceCurrency": "USD", "targetCurrency": "EUR", "amount": 100.0}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rate"], 0.90);
        assert_eq!(body["convertedAmount"], 90.0);
        assert_eq!(body["path"], "direct");
    }

    #[tokio::test]
    async fn test_convert_currency_via_pivot() {
        let h = harness();
        seed(&h.ledger, "USD", "EUR", 0.90).await;
        seed(&h.ledger, "USD", "ILS", 3.65).await;

        let (status, body) = send_json(
            &h.app,
            "POST",
            "/api/convert-currency",
            json!({"sourceCurrency": "EUR", "targetCurrency": "ILS", "amount": 10.0}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let rate = body["rate"].as_f64().unwrap();
        assert!((rate - 3.65 / 0.90).abs() < 1e-9);
        assert_eq!(body["path"]["via_pivot"], "USD");
    }

    #[tokio::test]
    async fn test_convert_unknown_currency_is_bad_request() {
        let h = harness();

        let (status, body) = send_json(
            &h.app,
            "POST",
            "/api/convert-currency",
            json!({"sourceCurrency": "XXX", "targetCurrency": "EUR", "amount": 100.0}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Unknown currency"));
    }

    #[tokio::test]
    async fn test_convert_missing_rate_is_not_an_error_status() {
        let h = harness();

        let (status, body) = send_json(
            &h.app,
            "POST",
            "/api/convert-currency",
            json!({"sourceCurrency": "GBP", "targetCurrency": "JPY", "amount": 100.0}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["rate"].is_null());
        assert_eq!(body["error"], "Exchange rate not found");
    }

    #[tokio::test]
    async fn test_manual_update_then_lookup() {
        let h = harness();
        seed(&h.ledger, "USD", "EUR", 0.90).await;

        let (status, _body) = send_json(
            &h.app,
            "PUT",
            "/api/exchange-rate",
            json!({"from": "USD", "to": "EUR", "rate": 0.95}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get(&h.app, "/api/exchange-rate?from=USD&to=EUR").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rate"], 0.95);
    }

    #[tokio::test]
    async fn test_manual_update_rejects_non_positive_rate() {
        let h = harness();

        let (status, _body) = send_json(
            &h.app,
            "PUT",
            "/api/exchange-rate",
            json!({"from": "USD", "to": "EUR", "rate": -2.0}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_db_rates_table() {
        let h = harness();
        seed(&h.ledger, "USD", "EUR", 0.90).await;
        seed(&h.ledger, "USD", "ILS", 3.65).await;

        let (status, body) = get(&h.app, "/api/db-exchange-rates?from=EUR").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["base"], "EUR");
        let ils = body["rates"]["ILS"].as_f64().unwrap();
        assert!((ils - 3.65 / 0.90).abs() < 1e-9);
        assert_eq!(body["rates"]["USD"], 0.90);
    }

    #[tokio::test]
    async fn test_historical_rates_ascending() {
        let h = harness();
        seed(&h.ledger, "USD", "EUR", 0.90).await;
        seed(&h.ledger, "USD", "EUR", 0.95).await;

        let today = now().date_naive();
        let uri = format!(
            "/api/historical-rates?from=USD&to=EUR&startDate={}&endDate={}",
            today, today
        );
        let (status, body) = get(&h.app, &uri).await;

        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["rate"], 0.90);
        assert_eq!(rows[1]["rate"], 0.95);
    }

    #[tokio::test]
    async fn test_fetch_latest_rates_ingests_pivot_batch() {
        let h = harness();
        let mut rates = BTreeMap::new();
        rates.insert(Currency::eur(), 0.92);
        rates.insert(Currency::ils(), 3.65);
        rates.insert(Currency::new("XAU"), 0.0005);
        h.provider.set_live(QuoteBatch {
            base: Currency::usd(),
            rates,
            observed_at: now(),
        });

        let (status, body) = send_json(&h.app, "POST", "/api/fetch-latest-rates", json!({})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["appended"], 2);
        assert_eq!(body["skipped"], 1);

        let (_, rate) = get(&h.app, "/api/exchange-rate?from=USD&to=EUR").await;
        assert_eq!(rate["rate"], 0.92);
    }

    #[tokio::test]
    async fn test_external_rates_no_data_is_ok_response() {
        let h = harness();

        let (status, body) = get(&h.app, "/api/external-exchange-rates?from=USD").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["rates"].is_null());
    }

    #[tokio::test]
    async fn test_external_rate_picks_pair_from_live_batch() {
        let h = harness();
        let mut rates = BTreeMap::new();
        rates.insert(Currency::eur(), 0.92);
        h.provider.set_live(QuoteBatch {
            base: Currency::usd(),
            rates,
            observed_at: now(),
        });

        let (status, body) =
            get(&h.app, "/api/external-exchange-rate?from=USD&to=EUR&amount=50").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rate"], 0.92);
        assert_eq!(body["result"], 46.0);
    }

    #[tokio::test]
    async fn test_provider_failure_is_bad_gateway() {
        let h = harness();
        h.provider.fail_with("connection refused");

        let (status, body) = get(&h.app, "/api/external-exchange-rates?from=USD").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }
}
