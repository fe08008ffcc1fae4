//! HTTP API for matches, odds ingest, arbitrage analysis and health checks.

pub mod handlers;
pub mod routes;

pub use handlers::{ApiError, AppState};
pub use routes::create_router;
