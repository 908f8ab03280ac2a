//! RateHub Server Binary
//!
//! Wires the SQLite ledger, resolution engine, and quote provider adapter
//! behind the HTTP API.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ratehub_common::CurrencyRegistry;
use ratehub_engine::{ConversionService, RateIngestor};
use ratehub_ledger::{RateLedger, SqliteLedger};
use ratehub_provider::{ExchangeHostConfig, ExchangeHostProvider};
use ratehub_server::{create_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting RateHub server");

    // Load configuration
    let config = ServerConfig::from_env();
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    // Open the store and load the currency reference set
    let sqlite = SqliteLedger::connect(&config.database_url).await?;
    sqlite.init_schema().await?;
    sqlite
        .seed_currencies(CurrencyRegistry::builtin().entries())
        .await?;
    let registry = Arc::new(CurrencyRegistry::new(sqlite.list_currencies().await?));

    if !registry.contains(&config.pivot) {
        error!(pivot = %config.pivot, "Pivot currency is not in the reference set");
        return Err(anyhow::anyhow!(
            "Configuration error: pivot {} is not a known currency",
            config.pivot
        ));
    }

    info!(
        currencies = registry.len(),
        pivot = %config.pivot,
        "Currency reference set loaded"
    );

    // Build the engine and the provider adapter
    let ledger: Arc<dyn RateLedger> = Arc::new(sqlite);
    let service = Arc::new(ConversionService::new(
        ledger.clone(),
        registry.clone(),
        config.pivot.clone(),
    ));
    let ingestor = Arc::new(RateIngestor::new(
        ledger,
        registry.clone(),
        config.pivot.clone(),
    ));
    let provider = Arc::new(ExchangeHostProvider::new(ExchangeHostConfig {
        base_url: config.provider_base_url.clone(),
        access_key: config.provider_access_key.clone(),
        timeout: config.provider_timeout,
    })?);

    let state = AppState {
        service,
        ingestor,
        provider,
        registry,
        pivot: config.pivot.clone(),
    };
    let app = create_router(state);

    let addr = format!("{}:{}", config.listen_addr, config.listen_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "RateHub server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
