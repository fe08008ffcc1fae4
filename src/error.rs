//! Unified error types for the odds arbitrage service.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::odds::OutcomeKey;

/// Unified error type for the service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Arbitrage engine validation error.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Odds store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Validation errors raised by the arbitrage engine.
///
/// The engine never substitutes a default for bad input; every anomaly is
/// surfaced through one of these variants before any allocation is computed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Decimal odds must be strictly greater than 1.0.
    #[error("invalid odds {odds} from {bookmaker} for outcome {outcome}: odds must be > 1.0")]
    InvalidOdds {
        /// Bookmaker that quoted the odds.
        bookmaker: String,
        /// Outcome the odds were quoted for.
        outcome: OutcomeKey,
        /// The rejected odds value.
        odds: Decimal,
    },

    /// The same outcome key appeared more than once.
    #[error("outcome {outcome} appears more than once")]
    DuplicateOutcome {
        /// The repeated outcome key.
        outcome: OutcomeKey,
    },

    /// No quote exists for a required outcome.
    #[error("no odds quoted for outcome {outcome}")]
    MissingOutcome {
        /// The outcome nobody quoted.
        outcome: OutcomeKey,
    },

    /// An event needs at least two mutually exclusive outcomes.
    #[error("need at least {required} outcomes, got {found}")]
    TooFewOutcomes {
        /// Number of outcomes supplied.
        found: usize,
        /// Minimum number of outcomes.
        required: usize,
    },

    /// Investment amount must be positive.
    #[error("invalid investment amount {0}: must be > 0")]
    InvalidInvestment(Decimal),

    /// Inputs too large to compute with fixed-point precision.
    #[error("numeric overflow while computing allocation")]
    NumericOverflow,
}

impl EngineError {
    /// Stable machine-readable error class.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidOdds { .. }
            | EngineError::DuplicateOutcome { .. }
            | EngineError::NumericOverflow => "invalid_odds",
            EngineError::MissingOutcome { .. } | EngineError::TooFewOutcomes { .. } => {
                "incomplete_odds"
            }
            EngineError::InvalidInvestment(_) => "invalid_investment",
        }
    }
}

/// Odds store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No match with this id.
    #[error("match {id} not found")]
    MatchNotFound {
        /// The unknown match id.
        id: String,
    },

    /// A bookmaker row was rejected.
    #[error("rejected odds row: {0}")]
    InvalidRow(#[from] EngineError),

    /// Failed to read a seed file.
    #[error("failed to read seed file {path}: {source}")]
    SeedRead {
        /// Path of the seed file.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Seed file is not valid JSON.
    #[error("failed to parse seed file {path}: {source}")]
    SeedParse {
        /// Path of the seed file.
        path: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
