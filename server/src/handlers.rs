//! Request handlers: bind arguments, call the engine, pick a status code.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use ratehub_common::{
    end_of_day, start_of_day, Currency, CurrencyInfo, CurrencyRegistry, RateObservation, RatePath,
    Timestamp, ValidationError,
};
use ratehub_engine::{ConversionService, RateIngestor, ServiceError};
use ratehub_provider::{FetchOutcome, ProviderError, QuoteProvider};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ConversionService>,
    pub ingestor: Arc<RateIngestor>,
    pub provider: Arc<dyn QuoteProvider>,
    pub registry: Arc<CurrencyRegistry>,
    pub pivot: Currency,
}

/// Error responses.
///
/// A resolvable-but-absent rate is not represented here: handlers answer it
/// with a 200 body carrying `rate: null`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => ApiError::Validation(e),
            ServiceError::Ledger(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Provider(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(status = %status, error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

fn not_found_body(message: &str) -> Response {
    Json(json!({ "rate": null, "error": message })).into_response()
}

/// GET /api/currencies
pub async fn get_currencies(State(state): State<AppState>) -> Json<Vec<CurrencyInfo>> {
    Json(state.service.currencies().to_vec())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub source_currency: String,
    pub target_currency: String,
    pub amount: f64,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConvertResponse {
    source_currency: Currency,
    target_currency: Currency,
    amount: f64,
    converted_amount: f64,
    rate: f64,
    path: RatePath,
    as_of: Timestamp,
}

/// POST /api/convert-currency
pub async fn convert_currency(
    State(state): State<AppState>,
    Json(request): Json<ConvertRequest>,
) -> Result<Response, ApiError> {
    let cutoff = request.date.map(end_of_day);
    let outcome = state
        .service
        .convert(
            &request.source_currency,
            &request.target_currency,
            request.amount,
            cutoff,
        )
        .await?;

    let Some(conversion) = outcome else {
        return Ok(not_found_body("Exchange rate not found"));
    };

    Ok(Json(ConvertResponse {
        source_currency: conversion.base,
        target_currency: conversion.quote,
        amount: conversion.amount,
        converted_amount: conversion.converted_amount,
        rate: conversion.resolved.rate,
        path: conversion.resolved.path,
        as_of: conversion.resolved.as_of,
    })
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct RateQuery {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RateResponse {
    rate: f64,
    path: RatePath,
    as_of: Timestamp,
}

/// GET /api/exchange-rate
pub async fn get_exchange_rate(
    State(state): State<AppState>,
    Query(query): Query<RateQuery>,
) -> Result<Response, ApiError> {
    let cutoff = query.date.map(end_of_day);
    let resolved = state
        .service
        .lookup(&query.from, &query.to, cutoff)
        .await?;

    let Some(resolved) = resolved else {
        return Ok(not_found_body("Rate not found"));
    };

    Ok(Json(RateResponse {
        rate: resolved.rate,
        path: resolved.path,
        as_of: resolved.as_of,
    })
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct UpdateRateRequest {
    pub from: String,
    pub to: String,
    pub rate: f64,
}

/// PUT /api/exchange-rate
pub async fn update_exchange_rate(
    State(state): State<AppState>,
    Json(request): Json<UpdateRateRequest>,
) -> Result<Response, ApiError> {
    let observation = state
        .service
        .record_manual_rate(&request.from, &request.to, request.rate)
        .await?;

    Ok(Json(json!({
        "message": "Rate updated successfully",
        "observedAt": observation.observed_at,
    }))
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct TableQuery {
    pub from: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct TableResponse {
    base: Currency,
    rates: BTreeMap<Currency, f64>,
    date: Option<NaiveDate>,
}

/// GET /api/db-exchange-rates
pub async fn get_db_rates(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Json<TableResponse>, ApiError> {
    let cutoff = query.date.map(end_of_day);
    let rates = state.service.table(&query.from, cutoff).await?;

    Ok(Json(TableResponse {
        base: Currency::new(query.from),
        rates,
        date: query.date,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub from: String,
    pub to: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// GET /api/historical-rates
pub async fn get_historical_rates(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<RateObservation>>, ApiError> {
    let rows = state
        .service
        .history(
            &query.from,
            &query.to,
            start_of_day(query.start_date),
            end_of_day(query.end_date),
        )
        .await?;

    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct ExternalRateQuery {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExternalRateResponse {
    rate: f64,
    result: f64,
    last_update: Timestamp,
}

/// GET /api/external-exchange-rate
pub async fn get_external_rate(
    State(state): State<AppState>,
    Query(query): Query<ExternalRateQuery>,
) -> Result<Response, ApiError> {
    let from = state.registry.require(&query.from)?;
    let to = state.registry.require(&query.to)?;
    let amount = query.amount.unwrap_or(1.0);
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError::InvalidAmount(amount).into());
    }

    let quote = match query.date {
        Some(date) => match state.provider.fetch_historical(&from, &to, date).await? {
            FetchOutcome::Success(quote) => Some((quote.rate, quote.observed_at)),
            FetchOutcome::NoData => None,
        },
        None => match state.provider.fetch_live(&from).await? {
            FetchOutcome::Success(batch) => batch
                .rates
                .get(&to)
                .map(|rate| (*rate, batch.observed_at)),
            FetchOutcome::NoData => None,
        },
    };

    let Some((rate, last_update)) = quote else {
        return Ok(not_found_body("No data from provider for this request"));
    };

    Ok(Json(ExternalRateResponse {
        rate,
        result: amount * rate,
        last_update,
    })
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct ExternalTableQuery {
    pub from: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExternalTableResponse {
    base: Currency,
    rates: BTreeMap<Currency, f64>,
    last_update: Timestamp,
}

/// GET /api/external-exchange-rates
pub async fn get_external_rates(
    State(state): State<AppState>,
    Query(query): Query<ExternalTableQuery>,
) -> Result<Response, ApiError> {
    let from = state.registry.require(&query.from)?;

    match state.provider.fetch_live(&from).await? {
        FetchOutcome::Success(batch) => Ok(Json(ExternalTableResponse {
            base: batch.base,
            rates: batch.rates,
            last_update: batch.observed_at,
        })
        .into_response()),
        FetchOutcome::NoData => Ok(Json(json!({
            "rates": null,
            "error": "No data from provider for this request",
        }))
        .into_response()),
    }
}

/// POST /api/fetch-latest-rates
///
/// The only write path driven by the external source: pulls live quotes for
/// the pivot and appends one observation per known quote currency.
pub async fn fetch_latest_rates(State(state): State<AppState>) -> Result<Response, ApiError> {
    match state.provider.fetch_live(&state.pivot).await? {
        FetchOutcome::Success(batch) => {
            let report = state.ingestor.ingest(&batch.rates, batch.observed_at).await?;
            Ok(Json(json!({
                "message": "Latest rates fetched and updated",
                "appended": report.appended,
                "skipped": report.skipped,
            }))
            .into_response())
        }
        FetchOutcome::NoData => Ok(Json(json!({
            "message": "No rates available from provider",
            "appended": 0,
            "skipped": 0,
        }))
        .into_response()),
    }
}
