//! Football odds arbitrage service.
//!
//! Collects 1X2 prices from several bookmakers, picks the best price per
//! outcome and tells whether backing every outcome at those prices locks in a
//! profit.
//!
//! # Strategy
//!
//! Each price implies a probability of `1 / odds`. When the best prices imply
//! less than 100% in total, staking in proportion to those probabilities pays
//! the same amount whatever the result, and that payout exceeds the stake:
//!
//! ```text
//! Home 2.10 @ Superbet  -> 47.62%
//! Draw 3.80 @ MaxBet    -> 26.32%
//! Away 4.20 @ Spin.ro   -> 23.81%
//! ──────────────────────────────
//! Total:                   97.74% < 100%
//! Profit on 100:           2.31 (guaranteed)
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`odds`]: Matches, bookmaker quotes and the odds store
//! - [`arbitrage`]: Best-odds selection and stake allocation
//! - [`metrics`]: Prometheus counters and latency histograms
//! - [`api`]: HTTP API
//! - [`utils`]: Utility functions

pub mod api;
pub mod arbitrage;
pub mod config;
pub mod error;
pub mod metrics;
pub mod odds;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
