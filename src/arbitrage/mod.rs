//! Arbitrage engine: best-odds selection and stake allocation.
//!
//! This module handles:
//! - Picking the highest price per outcome across bookmakers
//! - Implied-probability arithmetic and proportional staking
//! - Detection logging and metrics around both

pub mod calculator;
pub mod detector;
pub mod selector;

pub use calculator::{apportion, compute_arbitrage, round, ArbitrageResult, StakeAllocation};
pub use detector::{analyze_match, analyze_quotes, analyze_selection, Analysis};
pub use selector::{outcomes_in_order, select_best_match_odds, select_best_odds, MIN_OUTCOMES};
