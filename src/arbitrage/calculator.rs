//! Implied-probability arithmetic and proportional stake allocation.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::instrument;

use super::selector::MIN_OUTCOMES;
use crate::error::EngineError;
use crate::odds::{OddsQuote, OutcomeKey};

/// Decimal places for money amounts.
pub const MONEY_DP: u32 = 2;
/// Decimal places for allocation percentages (0-100 scale).
pub const PERCENT_DP: u32 = 2;
/// Decimal places for the implied probability sum.
pub const PROBABILITY_DP: u32 = 4;

/// Stake placed on one outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeAllocation {
    /// Bookmaker to place the bet with.
    pub bookmaker: String,
    /// Outcome backed.
    #[serde(rename = "type")]
    pub outcome: OutcomeKey,
    /// Decimal odds taken.
    #[serde(with = "rust_decimal::serde::float")]
    pub odds: Decimal,
    /// Amount to stake.
    #[serde(with = "rust_decimal::serde::float")]
    pub stake_amount: Decimal,
    /// Total payout if this outcome occurs.
    #[serde(with = "rust_decimal::serde::float")]
    pub potential_return: Decimal,
    /// Share of the investment on this outcome, in percent.
    ///
    /// This is a proportional allocation, not the classical Kelly fraction;
    /// the wire name is kept for existing consumers.
    #[serde(rename = "kellyPercentage", with = "rust_decimal::serde::float")]
    pub allocation_pct: Decimal,
}

/// Outcome of an arbitrage computation over one best-odds selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbitrageResult {
    /// One allocation per outcome, in selection order.
    #[serde(rename = "bets")]
    pub allocations: SmallVec<[StakeAllocation; 3]>,
    /// Whether the implied probabilities, at four decimal places, sum to less than 1.
    pub arbitrage_exists: bool,
    /// Sum of `1 / odds` across outcomes.
    #[serde(rename = "sumOfProbabilities", with = "rust_decimal::serde::float")]
    pub sum_of_implied_probabilities: Decimal,
    /// Guaranteed profit under arbitrage, otherwise a probability-weighted estimate.
    #[serde(with = "rust_decimal::serde::float")]
    pub expected_profit: Decimal,
    /// `expected_profit / investment * 100`.
    #[serde(rename = "expectedROI", with = "rust_decimal::serde::float")]
    pub expected_roi: Decimal,
}

impl ArbitrageResult {
    /// Sum of all stakes.
    pub fn total_stake(&self) -> Decimal {
        self.allocations.iter().map(|a| a.stake_amount).sum()
    }

    /// Sum of all allocation percentages.
    pub fn total_allocation_pct(&self) -> Decimal {
        self.allocations.iter().map(|a| a.allocation_pct).sum()
    }

    /// Payout that is guaranteed whatever the result, if any.
    pub fn guaranteed_return(&self) -> Option<Decimal> {
        if !self.arbitrage_exists {
            return None;
        }
        self.allocations.iter().map(|a| a.potential_return).min()
    }
}

/// Full-precision intermediate values, before output rounding.
struct RawAllocation {
    sum_of_probabilities: Decimal,
    arbitrage_exists: bool,
    fractions: Vec<Decimal>,
    stakes: Vec<Decimal>,
    returns: Vec<Decimal>,
    expected_profit: Decimal,
    expected_roi: Decimal,
}

/// Compute implied probabilities, detect arbitrage and allocate stakes.
///
/// Every outcome receives `(1/odds_i) / Σ(1/odds_j)` of the investment. When
/// the probabilities sum below 1 this yields the same payout whatever the
/// result; otherwise the same split is returned but carries no guarantee.
///
/// Validation happens before any arithmetic, and rounding only at the end.
///
/// # Errors
///
/// - [`EngineError::InvalidInvestment`] if `investment <= 0`.
/// - [`EngineError::TooFewOutcomes`] for fewer than two quotes.
/// - [`EngineError::InvalidOdds`] for any odds <= 1.0.
/// - [`EngineError::DuplicateOutcome`] if an outcome is quoted twice.
#[instrument(skip_all, fields(outcomes = selection.len(), investment = %investment))]
pub fn compute_arbitrage(
    selection: &[OddsQuote],
    investment: Decimal,
) -> Result<ArbitrageResult, EngineError> {
    validate_selection(selection, investment)?;

    let raw = allocate(selection, investment).ok_or(EngineError::NumericOverflow)?;

    let stakes = apportion(&raw.stakes, investment, MONEY_DP);
    let percentages: Vec<Decimal> = raw
        .fractions
        .iter()
        .map(|f| *f * Decimal::ONE_HUNDRED)
        .collect();
    let percentages = apportion(&percentages, Decimal::ONE_HUNDRED, PERCENT_DP);

    let allocations = selection
        .iter()
        .enumerate()
        .map(|(i, quote)| StakeAllocation {
            bookmaker: quote.bookmaker.clone(),
            outcome: quote.outcome.clone(),
            odds: quote.odds,
            stake_amount: stakes[i],
            potential_return: round(raw.returns[i], MONEY_DP),
            allocation_pct: percentages[i],
        })
        .collect();

    Ok(ArbitrageResult {
        allocations,
        arbitrage_exists: raw.arbitrage_exists,
        sum_of_implied_probabilities: round(raw.sum_of_probabilities, PROBABILITY_DP),
        expected_profit: round(raw.expected_profit, MONEY_DP),
        expected_roi: round(raw.expected_roi, PERCENT_DP),
    })
}

/// Reject anything the allocation formula cannot meaningfully price.
fn validate_selection(selection: &[OddsQuote], investment: Decimal) -> Result<(), EngineError> {
    if investment <= Decimal::ZERO {
        return Err(EngineError::InvalidInvestment(investment));
    }

    if selection.len() < MIN_OUTCOMES {
        return Err(EngineError::TooFewOutcomes {
            found: selection.len(),
            required: MIN_OUTCOMES,
        });
    }

    for quote in selection {
        quote.validate()?;
    }

    for (i, quote) in selection.iter().enumerate() {
        if selection[..i].iter().any(|q| q.outcome == quote.outcome) {
            return Err(EngineError::DuplicateOutcome {
                outcome: quote.outcome.clone(),
            });
        }
    }

    Ok(())
}

fn allocate(selection: &[OddsQuote], investment: Decimal) -> Option<RawAllocation> {
    let probabilities = selection
        .iter()
        .map(|q| Decimal::ONE.checked_div(q.odds))
        .collect::<Option<Vec<_>>>()?;

    let sum = probabilities
        .iter()
        .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(*p))?;
    if sum.is_zero() {
        return None;
    }

    let fractions = probabilities
        .iter()
        .map(|p| p.checked_div(sum))
        .collect::<Option<Vec<_>>>()?;
    let stakes = fractions
        .iter()
        .map(|f| f.checked_mul(investment))
        .collect::<Option<Vec<_>>>()?;
    let returns = stakes
        .iter()
        .zip(selection)
        .map(|(stake, q)| stake.checked_mul(q.odds))
        .collect::<Option<Vec<_>>>()?;

    // Decided on the reported precision: 1/3 truncates at 28 places, so three
    // fair prices of 3.00 would otherwise sum just below 1.
    let arbitrage_exists = round(sum, PROBABILITY_DP) < Decimal::ONE;

    let expected_profit = if arbitrage_exists {
        // Every return is identical here, so any outcome gives the profit.
        returns[0].checked_sub(investment)?
    } else {
        let weighted = probabilities
            .iter()
            .zip(&returns)
            .try_fold(Decimal::ZERO, |acc, (p, r)| {
                acc.checked_add(p.checked_mul(r.checked_sub(investment)?)?)
            })?;
        weighted.checked_div(sum)?
    };

    let expected_roi = expected_profit
        .checked_div(investment)?
        .checked_mul(Decimal::ONE_HUNDRED)?;

    Some(RawAllocation {
        sum_of_probabilities: sum,
        arbitrage_exists,
        fractions,
        stakes,
        returns,
        expected_profit,
        expected_roi,
    })
}

/// Round half away from zero.
pub fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Round non-negative shares to `dp` places so they add up to `total`.
///
/// Largest-remainder method: every share is truncated, then the leftover
/// units go to the largest truncated remainders. Equal remainders keep input
/// order.
pub fn apportion(shares: &[Decimal], total: Decimal, dp: u32) -> Vec<Decimal> {
    let unit = Decimal::new(1, dp);
    let target = round(total, dp);

    let mut rounded: Vec<Decimal> = shares
        .iter()
        .map(|s| s.round_dp_with_strategy(dp, RoundingStrategy::ToZero))
        .collect();
    let assigned: Decimal = rounded.iter().sum();
    let leftover = ((target - assigned) / unit)
        .round()
        .to_usize()
        .unwrap_or(0);

    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|&a, &b| (shares[b] - rounded[b]).cmp(&(shares[a] - rounded[a])));

    for &i in order.iter().cycle().take(leftover) {
        rounded[i] += unit;
    }

    rounded
}
