//! Engine error types.

use thiserror::Error;

use ratehub_common::ValidationError;
use ratehub_ledger::LedgerError;

/// Errors surfaced by the conversion façade.
///
/// An unresolvable pair is not represented here: "no rate data" is a normal
/// outcome and modeled as `Ok(None)` by the resolving operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input rejected before any I/O.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The ledger failed underneath the engine.
    #[error(transparent)]
    Ledger(LedgerError),
}

impl From<LedgerError> for ServiceError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(e) => ServiceError::Validation(e),
            other => ServiceError::Ledger(other),
        }
    }
}
