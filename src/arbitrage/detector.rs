//! Arbitrage detection over aggregated bookmaker odds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::calculator::{compute_arbitrage, ArbitrageResult};
use super::selector::{select_best_match_odds, select_best_odds};
use crate::error::EngineError;
use crate::metrics;
use crate::odds::{BookmakerOdds, OddsQuote, OutcomeKey};

/// Best-odds selection together with the allocation computed from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Best quote per outcome.
    pub best_odds: Vec<OddsQuote>,
    /// Allocation over `best_odds`.
    pub result: ArbitrageResult,
}

/// Select the best 1/X/2 odds across bookmaker rows and allocate stakes.
#[instrument(skip(rows), fields(bookmakers = rows.len()))]
pub fn analyze_match(rows: &[BookmakerOdds], investment: Decimal) -> Result<Analysis, EngineError> {
    let _timer = metrics::timer_computation();
    let outcome = select_best_match_odds(rows).and_then(|best| analyze_selection(best, investment));
    record(&outcome);
    outcome
}

/// Select the best odds for arbitrary outcomes and allocate stakes.
#[instrument(skip(quotes, outcomes), fields(quotes = quotes.len()))]
pub fn analyze_quotes(
    quotes: &[OddsQuote],
    outcomes: &[OutcomeKey],
    investment: Decimal,
) -> Result<Analysis, EngineError> {
    let _timer = metrics::timer_computation();
    let outcome =
        select_best_odds(quotes, outcomes).and_then(|best| analyze_selection(best, investment));
    record(&outcome);
    outcome
}

/// Allocate stakes over a selection the caller already made.
pub fn analyze_selection(best_odds: Vec<OddsQuote>, investment: Decimal) -> Result<Analysis, EngineError> {
    let result = compute_arbitrage(&best_odds, investment)?;
    Ok(Analysis { best_odds, result })
}

fn record(outcome: &Result<Analysis, EngineError>) {
    match outcome {
        Ok(analysis) => {
            metrics::inc_computations();
            let result = &analysis.result;
            if result.arbitrage_exists {
                metrics::inc_opportunities_detected();
                info!(
                    sum_of_probabilities = %result.sum_of_implied_probabilities,
                    expected_profit = %result.expected_profit,
                    expected_roi = %result.expected_roi,
                    "Arbitrage opportunity detected"
                );
            } else {
                debug!(
                    sum_of_probabilities = %result.sum_of_implied_probabilities,
                    "No arbitrage opportunity"
                );
            }
        }
        Err(e) => {
            metrics::inc_engine_errors(e.code());
            warn!(code = e.code(), error = %e, "Arbitrage input rejected");
        }
    }
}
