//! RateHub Resolution Engine
//!
//! Derives conversion answers from a sparse, append-only ledger of pairwise
//! observations: direct-or-pivot per-pair resolution, one-pass full-table
//! synthesis, and the conversion façade used by the HTTP layer.
//!
//! The engine is stateless between calls; all state lives in the injected
//! [`RateLedger`](ratehub_ledger::RateLedger).

pub mod error;
pub mod ingest;
pub mod resolver;
pub mod service;
pub mod table;

pub use error::ServiceError;
pub use ingest::{IngestReport, RateIngestor};
pub use resolver::RateResolver;
pub use service::{Conversion, ConversionService};
pub use table::TableSynthesizer;
