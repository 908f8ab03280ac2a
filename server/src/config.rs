//! Server configuration.

use std::time::Duration;

use ratehub_common::Currency;

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// SQLite database URL.
    pub database_url: String,
    /// Quote provider base URL.
    pub provider_base_url: String,
    /// Quote provider access key.
    pub provider_access_key: Option<String>,
    /// Hard timeout for provider requests.
    pub provider_timeout: Duration,
    /// Pivot currency used for rate composition and bulk ingestion.
    pub pivot: Currency,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 3001,
            database_url: "sqlite://ratehub.db?mode=rwc".to_string(),
            provider_base_url: "https://api.exchangerate.host".to_string(),
            provider_access_key: None,
            provider_timeout: Duration::from_secs(10),
            pivot: Currency::usd(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("RATEHUB_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Ok(port) = std::env::var("RATEHUB_LISTEN_PORT") {
            if let Ok(port) = port.parse() {
                config.listen_port = port;
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }

        if let Ok(base) = std::env::var("EXCHANGE_API_BASE") {
            config.provider_base_url = base;
        }

        if let Ok(key) = std::env::var("EXCHANGE_API_KEY") {
            if !key.is_empty() {
                config.provider_access_key = Some(key);
            }
        }

        if let Ok(secs) = std::env::var("RATEHUB_PROVIDER_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.provider_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(pivot) = std::env::var("RATEHUB_PIVOT") {
            if let Ok(pivot) = Currency::parse(&pivot) {
                config.pivot = pivot;
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port == 0 {
            return Err("Listen port cannot be 0".to_string());
        }

        if self.database_url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }

        if self.provider_base_url.is_empty() {
            return Err("Provider base URL cannot be empty".to_string());
        }

        if self.provider_timeout.is_zero() {
            return Err("Provider timeout cannot be zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pivot, Currency::usd());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = ServerConfig::default();
        config.listen_port = 0;
        assert!(config.validate().is_err());
    }
}
