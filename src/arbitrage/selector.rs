//! Best-odds selection across bookmakers.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::error::EngineError;
use crate::odds::{BookmakerOdds, MatchOutcome, OddsQuote, OutcomeKey};

/// Minimum number of mutually exclusive outcomes an event can have.
pub const MIN_OUTCOMES: usize = 2;

/// Pick the highest-priced quote for every outcome key.
///
/// The returned selection holds exactly one quote per key, in the order of
/// `outcomes`. Ties keep the quote seen first, so the result only depends on
/// the input order.
///
/// # Errors
///
/// - [`EngineError::TooFewOutcomes`] if fewer than two keys are requested.
/// - [`EngineError::DuplicateOutcome`] if a key is requested twice.
/// - [`EngineError::InvalidOdds`] if a quote for a requested key is <= 1.0.
/// - [`EngineError::MissingOutcome`] naming the first key nobody quoted.
#[instrument(skip_all, fields(quotes = quotes.len(), outcomes = outcomes.len()))]
pub fn select_best_odds(
    quotes: &[OddsQuote],
    outcomes: &[OutcomeKey],
) -> Result<Vec<OddsQuote>, EngineError> {
    if outcomes.len() < MIN_OUTCOMES {
        return Err(EngineError::TooFewOutcomes {
            found: outcomes.len(),
            required: MIN_OUTCOMES,
        });
    }

    let mut seen = HashSet::with_capacity(outcomes.len());
    for outcome in outcomes {
        if !seen.insert(outcome) {
            return Err(EngineError::DuplicateOutcome {
                outcome: outcome.clone(),
            });
        }
    }

    // A bad price fails the selection even when a better one exists.
    for quote in quotes.iter().filter(|q| seen.contains(&q.outcome)) {
        quote.validate()?;
    }

    outcomes
        .iter()
        .map(|outcome| {
            let best = quotes
                .iter()
                .filter(|q| &q.outcome == outcome)
                .fold(None::<&OddsQuote>, |best, current| match best {
                    Some(b) if current.odds <= b.odds => Some(b),
                    _ => Some(current),
                })
                .ok_or_else(|| EngineError::MissingOutcome {
                    outcome: outcome.clone(),
                })?;

            debug!(
                outcome = %outcome,
                bookmaker = %best.bookmaker,
                odds = %best.odds,
                "Best odds selected"
            );

            Ok(best.clone())
        })
        .collect()
}

/// Best 1/X/2 odds across a set of bookmaker rows.
pub fn select_best_match_odds(rows: &[BookmakerOdds]) -> Result<Vec<OddsQuote>, EngineError> {
    let quotes: Vec<OddsQuote> = rows.iter().flat_map(BookmakerOdds::quotes).collect();
    select_best_odds(&quotes, &MatchOutcome::keys())
}

/// Outcome keys in first-seen order.
pub fn outcomes_in_order(quotes: &[OddsQuote]) -> Vec<OutcomeKey> {
    let mut seen = HashSet::new();
    quotes
        .iter()
        .filter(|q| seen.insert(&q.outcome))
        .map(|q| q.outcome.clone())
        .collect()
}
