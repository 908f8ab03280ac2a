//! SQLite-backed ledger using sqlx.
//!
//! The store keeps the append-only discipline at the schema level: rows in
//! `exchange_rates` are inserted and read, never updated or deleted. Write
//! serialization is left to SQLite itself.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use ratehub_common::{Currency, CurrencyInfo, RateObservation, RateSource, Timestamp};

use crate::store::{LedgerError, RateLedger};

const CREATE_CURRENCIES: &str = "\
CREATE TABLE IF NOT EXISTS currencies (
  code TEXT PRIMARY KEY,
  name TEXT NOT NULL
)";

const CREATE_EXCHANGE_RATES: &str = "\
CREATE TABLE IF NOT EXISTS exchange_rates (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  from_currency TEXT NOT NULL,
  to_currency TEXT NOT NULL,
  rate REAL NOT NULL,
  created_at TEXT NOT NULL,
  source TEXT NOT NULL DEFAULT 'local',
  FOREIGN KEY (from_currency) REFERENCES currencies(code),
  FOREIGN KEY (to_currency) REFERENCES currencies(code)
)";

const CREATE_PAIR_INDEX: &str = "\
CREATE INDEX IF NOT EXISTS idx_exchange_rates_pair
  ON exchange_rates (from_currency, to_currency, created_at)";

#[derive(Debug, sqlx::FromRow)]
struct RateRow {
    from_currency: String,
    to_currency: String,
    rate: f64,
    created_at: DateTime<Utc>,
    source: String,
}

impl From<RateRow> for RateObservation {
    fn from(row: RateRow) -> Self {
        RateObservation::new(
            Currency::new(row.from_currency),
            Currency::new(row.to_currency),
            row.rate,
            row.created_at,
            RateSource::from_str_lossy(&row.source),
        )
    }
}

/// Ledger backed by a SQLite connection pool.
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Wrap an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database by URL (e.g. `sqlite://ratehub.db?mode=rwc`).
    pub async fn connect(url: &str) -> Result<Self, LedgerError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Open a fresh in-memory database with the schema applied.
    ///
    /// The pool is capped at a single connection; every connection to
    /// `sqlite::memory:` is otherwise a distinct empty database.
    pub async fn in_memory() -> Result<Self, LedgerError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let ledger = Self::new(pool);
        ledger.init_schema().await?;
        Ok(ledger)
    }

    /// Access the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the `currencies` and `exchange_rates` tables if missing.
    pub async fn init_schema(&self) -> Result<(), LedgerError> {
        sqlx::query(CREATE_CURRENCIES).execute(&self.pool).await?;
        sqlx::query(CREATE_EXCHANGE_RATES)
            .execute(&self.pool)
            .await?;
        sqlx::query(CREATE_PAIR_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    /// Insert the reference entries if the currencies table is empty.
    /// Returns the number of rows inserted.
    pub async fn seed_currencies(&self, entries: &[CurrencyInfo]) -> Result<usize, LedgerError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM currencies")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            debug!(existing = count, "Currencies table already seeded");
            return Ok(0);
        }

        for entry in entries {
            sqlx::query("INSERT INTO currencies (code, name) VALUES (?, ?)")
                .bind(entry.code.code())
                .bind(&entry.name)
                .execute(&self.pool)
                .await?;
        }

        info!(inserted = entries.len(), "Seeded currency reference set");
        Ok(entries.len())
    }

    /// The currency reference set, in insertion order.
    pub async fn list_currencies(&self) -> Result<Vec<CurrencyInfo>, LedgerError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT code, name FROM currencies ORDER BY rowid")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(code, name)| CurrencyInfo::new(code, name))
            .collect())
    }
}

#[async_trait]
impl RateLedger for SqliteLedger {
    async fn append(&self, observation: RateObservation) -> Result<(), LedgerError> {
        observation.validate()?;

        sqlx::query(
            "INSERT INTO exchange_rates (from_currency, to_currency, rate, created_at, source) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(observation.base.code())
        .bind(observation.quote.code())
        .bind(observation.rate)
        .bind(observation.observed_at)
        .bind(observation.source.as_str())
        .execute(&self.pool)
        .await?;

        debug!(
            base = %observation.base,
            quote = %observation.quote,
            rate = observation.rate,
            source = %observation.source,
            "Appended observation"
        );
        Ok(())
    }

    async fn latest_before(
        &self,
        base: &Currency,
        quote: &Currency,
        cutoff: Option<Timestamp>,
    ) -> Result<Option<RateObservation>, LedgerError> {
        let mut sql = String::from(
            "SELECT from_currency, to_currency, rate, created_at, source \
             FROM exchange_rates WHERE from_currency = ? AND to_currency = ?",
        );
        if cutoff.is_some() {
            sql.push_str(" AND created_at <= ?");
        }
        // id DESC breaks observed_at ties in favor of the later insert.
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT 1");

        let mut query = sqlx::query_as::<_, RateRow>(&sql)
            .bind(base.code())
            .bind(quote.code());
        if let Some(cutoff) = cutoff {
            query = query.bind(cutoff);
        }

        let row = query.fetch_optional(&self.pool).await?;
        Ok(row.map(RateObservation::from))
    }

    async fn all_latest_from(
        &self,
        base: &Currency,
        cutoff: Option<Timestamp>,
    ) -> Result<BTreeMap<Currency, RateObservation>, LedgerError> {
        let mut sql = String::from(
            "SELECT from_currency, to_currency, rate, created_at, source \
             FROM exchange_rates WHERE from_currency = ?",
        );
        if cutoff.is_some() {
            sql.push_str(" AND created_at <= ?");
        }
        sql.push_str(" ORDER BY to_currency, created_at DESC, id DESC");

        let mut query = sqlx::query_as::<_, RateRow>(&sql).bind(base.code());
        if let Some(cutoff) = cutoff {
            query = query.bind(cutoff);
        }

        let rows = query.fetch_all(&self.pool).await?;

        // One query, grouped here: keep the first (= most recent) row per
        // quote currency.
        let mut latest = BTreeMap::new();
        for row in rows {
            let observation = RateObservation::from(row);
            latest
                .entry(observation.quote.clone())
                .or_insert(observation);
        }
        Ok(latest)
    }

    async fn in_range(
        &self,
        base: &Currency,
        quote: &Currency,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<RateObservation>, LedgerError> {
        let rows = sqlx::query_as::<_, RateRow>(
            "SELECT from_currency, to_currency, rate, created_at, source \
             FROM exchange_rates \
             WHERE from_currency = ? AND to_currency = ? \
               AND created_at >= ? AND created_at <= ? \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(base.code())
        .bind(quote.code())
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RateObservation::from).collect())
    }
}
