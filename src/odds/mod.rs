//! Odds module for football matches.
//!
//! This module handles:
//! - Outcome keys, quotes and per-bookmaker 1X2 rows
//! - The in-memory odds store fed by scrapers
//! - Sample fixtures for demos and tests

pub mod sample;
pub mod store;
pub mod types;

pub use sample::{sample_entries, SAMPLE_ARBITRAGE_MATCH_ID};
pub use store::{MatchEntry, OddsStore};
pub use types::{BookmakerOdds, FootballMatch, MatchOutcome, OddsQuote, OutcomeKey};
