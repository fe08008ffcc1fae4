//! Property tests for the allocation invariants.

use proptest::prelude::*;
use rust_decimal::Decimal;

use odds_arb::arbitrage::compute_arbitrage;
use odds_arb::odds::OddsQuote;

/// Decimal odds between 1.01 and 50.00, in hundredths.
fn odds_strategy() -> impl Strategy<Value = Decimal> {
    (101i64..=5000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Between two and six outcomes, one quote each.
fn selection_strategy() -> impl Strategy<Value = Vec<OddsQuote>> {
    prop::collection::vec(odds_strategy(), 2..=6).prop_map(|odds| {
        odds.into_iter()
            .enumerate()
            .map(|(i, o)| OddsQuote::new(format!("Book {}", i), format!("Outcome {}", i + 1), o))
            .collect()
    })
}

/// Investment between 0.01 and 100000.00.
fn investment_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn implied_sum(selection: &[OddsQuote]) -> Decimal {
    selection.iter().map(|q| Decimal::ONE / q.odds).sum()
}

proptest! {
    #[test]
    fn sum_of_probabilities_matches_inverse_odds(
        selection in selection_strategy(),
        investment in investment_strategy()
    ) {
        let result = compute_arbitrage(&selection, investment).unwrap();
        let diff = (result.sum_of_implied_probabilities - implied_sum(&selection)).abs();
        prop_assert!(diff <= Decimal::new(1, 4), "diff {}", diff);
    }

    #[test]
    fn arbitrage_flag_follows_reported_sum(
        selection in selection_strategy(),
        investment in investment_strategy()
    ) {
        let result = compute_arbitrage(&selection, investment).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        let reported = json["sumOfProbabilities"].as_f64().unwrap();
        prop_assert_eq!(result.arbitrage_exists, result.sum_of_implied_probabilities < Decimal::ONE);
        prop_assert_eq!(json["arbitrageExists"].as_bool().unwrap(), reported < 1.0);
    }

    #[test]
    fn equal_prices_are_never_an_arbitrage(
        outcomes in 2usize..=10,
        investment in investment_strategy()
    ) {
        let odds = Decimal::from(outcomes as u64);
        let selection: Vec<OddsQuote> = (0..outcomes)
            .map(|i| OddsQuote::new("Book", format!("Outcome {}", i + 1), odds))
            .collect();

        let result = compute_arbitrage(&selection, investment).unwrap();

        prop_assert!(!result.arbitrage_exists);
        prop_assert_eq!(result.sum_of_implied_probabilities, Decimal::ONE);
    }

    #[test]
    fn stakes_add_up_to_investment(
        selection in selection_strategy(),
        investment in investment_strategy()
    ) {
        let result = compute_arbitrage(&selection, investment).unwrap();
        let diff = (result.total_stake() - investment).abs();
        prop_assert!(diff <= Decimal::new(1, 2), "stakes off by {}", diff);
        prop_assert!(result.allocations.iter().all(|a| a.stake_amount >= Decimal::ZERO));
    }

    #[test]
    fn percentages_add_up_to_one_hundred(
        selection in selection_strategy(),
        investment in investment_strategy()
    ) {
        let result = compute_arbitrage(&selection, investment).unwrap();
        let diff = (result.total_allocation_pct() - Decimal::ONE_HUNDRED).abs();
        prop_assert!(diff <= Decimal::new(1, 1), "percentages off by {}", diff);
    }

    #[test]
    fn arbitrage_returns_are_equal(
        selection in selection_strategy(),
        investment in investment_strategy()
    ) {
        let result = compute_arbitrage(&selection, investment).unwrap();
        if result.arbitrage_exists {
            let returns: Vec<Decimal> =
                result.allocations.iter().map(|a| a.potential_return).collect();
            let max = returns.iter().copied().max().unwrap_or_default();
            let min = returns.iter().copied().min().unwrap_or_default();
            prop_assert!(max - min < Decimal::new(2, 2), "returns spread {}", max - min);
        }
    }

    #[test]
    fn computation_is_deterministic(
        selection in selection_strategy(),
        investment in investment_strategy()
    ) {
        let first = compute_arbitrage(&selection, investment).unwrap();
        let second = compute_arbitrage(&selection, investment).unwrap();
        prop_assert_eq!(first, second);
    }
}
