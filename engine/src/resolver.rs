//! Per-pair rate resolution: direct observation or one pivot hop.

use std::sync::Arc;

use tracing::{debug, instrument};

use ratehub_common::{now, Currency, ResolvedRate, Timestamp};
use ratehub_ledger::{LedgerError, RateLedger};

/// Resolves the best-known rate for a currency pair as of a cutoff time.
///
/// The ledger is sparse by construction; composing through the pivot currency
/// is what answers most pair queries without requiring O(n²) recorded pairs.
/// Two hops is the limit: a pair unreachable in one pivot hop is reported as
/// unresolved, never searched further.
pub struct RateResolver {
    ledger: Arc<dyn RateLedger>,
    pivot: Currency,
}

impl RateResolver {
    /// Create a resolver over a ledger with the given pivot currency.
    pub fn new(ledger: Arc<dyn RateLedger>, pivot: Currency) -> Self {
        Self { ledger, pivot }
    }

    /// The designated pivot currency.
    pub fn pivot(&self) -> &Currency {
        &self.pivot
    }

    /// Resolve `base` → `quote` at or before `cutoff` (`None` = latest).
    ///
    /// Returns `Ok(None)` when no direct observation and no pivot composition
    /// exists; that is a normal outcome, not an error.
    #[instrument(skip(self), fields(base = %base, quote = %quote))]
    pub async fn resolve(
        &self,
        base: &Currency,
        quote: &Currency,
        cutoff: Option<Timestamp>,
    ) -> Result<Option<ResolvedRate>, LedgerError> {
        if base == quote {
            let as_of = cutoff.unwrap_or_else(now);
            return Ok(Some(ResolvedRate::identity(base.clone(), as_of)));
        }

        if let Some(observation) = self.ledger.latest_before(base, quote, cutoff).await? {
            debug!(rate = observation.rate, "Resolved directly");
            return Ok(Some(ResolvedRate::direct(&observation)));
        }

        if base != &self.pivot && quote != &self.pivot {
            if let Some(resolved) = self.compose(base, quote, cutoff).await? {
                debug!(rate = resolved.rate, "Resolved through pivot");
                return Ok(Some(resolved));
            }
        }

        debug!("No rate data");
        Ok(None)
    }

    /// One pivot hop. Preferred form uses a recorded `base → pivot` leg
    /// multiplied by `pivot → quote`; when the base leg only exists anchored
    /// at the pivot (`pivot → base`), the composition divides the two
    /// pivot-anchored observations instead. No leg is ever inverted into a
    /// synthetic observation.
    async fn compose(
        &self,
        base: &Currency,
        quote: &Currency,
        cutoff: Option<Timestamp>,
    ) -> Result<Option<ResolvedRate>, LedgerError> {
        let pivot_to_quote = match self.ledger.latest_before(&self.pivot, quote, cutoff).await? {
            Some(observation) => observation,
            None => return Ok(None),
        };

        if let Some(to_pivot) = self.ledger.latest_before(base, &self.pivot, cutoff).await? {
            return Ok(Some(ResolvedRate::via_pivot(
                base.clone(),
                quote.clone(),
                self.pivot.clone(),
                to_pivot.rate * pivot_to_quote.rate,
                to_pivot.observed_at,
                pivot_to_quote.observed_at,
            )));
        }

        if let Some(pivot_to_base) = self.ledger.latest_before(&self.pivot, base, cutoff).await? {
            return Ok(Some(ResolvedRate::via_pivot(
                base.clone(),
                quote.clone(),
                self.pivot.clone(),
                pivot_to_quote.rate / pivot_to_base.rate,
                pivot_to_base.observed_at,
                pivot_to_quote.observed_at,
            )));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use ratehub_common::{RateObservation, RatePath, RateSource};
    use ratehub_ledger::MemoryLedger;

    fn obs(base: &str, quote: &str, rate: f64, at: Timestamp) -> RateObservation {
        RateObservation::new(
            Currency::new(base),
            Currency::new(quote),
            rate,
            at,
            RateSource::Local,
        )
    }

    async fn resolver_with(rows: Vec<RateObservation>) -> RateResolver {
        let ledger = Arc::new(MemoryLedger::new());
        for row in rows {
            ledger.append(row).await.unwrap();
        }
        RateResolver::new(ledger, Currency::usd())
    }

    #[tokio::test]
    async fn test_same_currency_is_identity() {
        let resolver = resolver_with(vec![]).await;

        let resolved = resolver
            .resolve(&Currency::eur(), &Currency::eur(), None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.rate, 1.0);
        assert_eq!(resolved.path, RatePath::Direct);
    }

    #[tokio::test]
    async fn test_direct_observation_wins_over_pivot() {
        let t = now();
        let resolver = resolver_with(vec![
            obs("EUR", "ILS", 4.20, t),
            obs("USD", "EUR", 0.90, t),
            obs("USD", "ILS", 3.65, t),
        ])
        .await;

        let resolved = resolver
            .resolve(&Currency::eur(), &Currency::ils(), None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.rate, 4.20);
        assert_eq!(resolved.path, RatePath::Direct);
    }

    #[tokio::test]
    async fn test_pivot_composition_multiplies_through_recorded_leg() {
        let t = now();
        let resolver = resolver_with(vec![
            obs("EUR", "USD", 1.10, t),
            obs("USD", "ILS", 3.65, t),
        ])
        .await;

        let resolved = resolver
            .resolve(&Currency::eur(), &Currency::ils(), None)
            .await
            .unwrap()
            .unwrap();

        assert!((resolved.rate - 1.10 * 3.65).abs() < 1e-12);
        assert_eq!(resolved.path, RatePath::ViaPivot(Currency::usd()));
    }

    #[tokio::test]
    async fn test_pivot_composition_from_pivot_anchored_legs() {
        let t = now();
        let resolver = resolver_with(vec![
            obs("USD", "EUR", 0.90, t),
            obs("USD", "ILS", 3.65, t),
        ])
        .await;

        let resolved = resolver
            .resolve(&Currency::eur(), &Currency::ils(), None)
            .await
            .unwrap()
            .unwrap();

        assert!((resolved.rate - 3.65 / 0.90).abs() < 1e-9);
        assert_eq!(resolved.path, RatePath::ViaPivot(Currency::usd()));
    }

    #[tokio::test]
    async fn test_inverse_is_never_derived() {
        let t = now();
        let resolver = resolver_with(vec![
            obs("USD", "EUR", 0.90, t),
            obs("USD", "ILS", 3.65, t),
        ])
        .await;

        // EUR → USD has no direct row, and composition is skipped when the
        // quote is the pivot itself.
        let resolved = resolver
            .resolve(&Currency::eur(), &Currency::usd(), None)
            .await
            .unwrap();

        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_pair_is_none() {
        let t = now();
        let resolver = resolver_with(vec![obs("USD", "EUR", 0.90, t)]).await;

        let resolved = resolver
            .resolve(&Currency::gbp(), &Currency::jpy(), None)
            .await
            .unwrap();

        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_newest_observation_supersedes() {
        let ledger = Arc::new(MemoryLedger::new());
        let t0 = now() - Duration::hours(1);
        ledger.append(obs("USD", "EUR", 0.90, t0)).await.unwrap();

        let resolver = RateResolver::new(ledger.clone(), Currency::usd());
        let first = resolver
            .resolve(&Currency::usd(), &Currency::eur(), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.rate, 0.90);

        ledger.append(obs("USD", "EUR", 0.95, now())).await.unwrap();

        let second = resolver
            .resolve(&Currency::usd(), &Currency::eur(), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.rate, 0.95);
    }

    #[tokio::test]
    async fn test_cutoff_selects_historical_rate() {
        let t0 = now() - Duration::days(2);
        let t1 = now() - Duration::days(1);
        let resolver = resolver_with(vec![
            obs("USD", "EUR", 0.90, t0),
            obs("USD", "EUR", 0.95, t1),
        ])
        .await;

        let historical = resolver
            .resolve(&Currency::usd(), &Currency::eur(), Some(t0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(historical.rate, 0.90);
        assert_eq!(historical.as_of, t0);
    }

    #[tokio::test]
    async fn test_composed_as_of_is_stalest_leg() {
        let older = now() - Duration::hours(5);
        let newer = now() - Duration::hours(1);
        let resolver = resolver_with(vec![
            obs("USD", "EUR", 0.90, older),
            obs("USD", "ILS", 3.65, newer),
        ])
        .await;

        let resolved = resolver
            .resolve(&Currency::eur(), &Currency::ils(), None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.as_of, older);
    }
}
