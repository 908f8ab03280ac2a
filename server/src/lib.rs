//! RateHub HTTP boundary.
//!
//! A thin axum shell over the conversion service, table synthesizer, and
//! quote provider adapter. Argument binding and response-status selection
//! live here; all decision logic stays in the engine crates.

pub mod config;
pub mod handlers;
pub mod routes;

pub use config::ServerConfig;
pub use handlers::AppState;
pub use routes::create_router;
