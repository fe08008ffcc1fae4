//! End-to-end scenarios through the public engine and store API.

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use odds_arb::arbitrage::{analyze_match, compute_arbitrage, select_best_odds};
use odds_arb::error::EngineError;
use odds_arb::odds::{
    BookmakerOdds, MatchOutcome, OddsQuote, OddsStore, OutcomeKey, SAMPLE_ARBITRAGE_MATCH_ID,
};

fn quote(bookmaker: &str, outcome: &str, odds: Decimal) -> OddsQuote {
    OddsQuote::new(bookmaker, outcome, odds)
}

fn one_x_two() -> Vec<OutcomeKey> {
    MatchOutcome::keys()
}

#[test]
fn best_odds_across_bookmakers_form_an_arbitrage() {
    let quotes = vec![
        quote("Superbet", "1", dec!(2.10)),
        quote("Superbet", "X", dec!(3.40)),
        quote("Superbet", "2", dec!(3.90)),
        quote("MaxBet", "1", dec!(2.00)),
        quote("MaxBet", "X", dec!(3.80)),
        quote("MaxBet", "2", dec!(4.00)),
        quote("Spin.ro", "1", dec!(2.05)),
        quote("Spin.ro", "X", dec!(3.60)),
        quote("Spin.ro", "2", dec!(4.20)),
    ];

    let best = select_best_odds(&quotes, &one_x_two()).unwrap();
    let bookmakers: Vec<&str> = best.iter().map(|q| q.bookmaker.as_str()).collect();
    assert_eq!(bookmakers, vec!["Superbet", "MaxBet", "Spin.ro"]);

    let result = compute_arbitrage(&best, dec!(100)).unwrap();
    assert!(result.arbitrage_exists);
    assert_eq!(result.sum_of_implied_probabilities, dec!(0.9774));
    assert_eq!(result.expected_profit, dec!(2.31));
    assert_eq!(result.expected_roi, dec!(2.31));
    assert_eq!(result.total_stake(), dec!(100));
    assert_eq!(result.guaranteed_return(), Some(dec!(102.31)));
}

#[test]
fn overround_market_has_negative_expectation() {
    let best = vec![
        quote("Superbet", "1", dec!(1.80)),
        quote("MaxBet", "X", dec!(3.00)),
        quote("Spin.ro", "2", dec!(4.00)),
    ];

    let result = compute_arbitrage(&best, dec!(100)).unwrap();

    assert!(!result.arbitrage_exists);
    assert_eq!(result.sum_of_implied_probabilities, dec!(1.1389));
    assert!(result.expected_profit < Decimal::ZERO);
    assert_eq!(result.guaranteed_return(), None);
    assert_eq!(result.total_stake(), dec!(100));
}

#[test]
fn missing_outcome_is_named() {
    let quotes = vec![
        quote("Superbet", "1", dec!(2.10)),
        quote("MaxBet", "X", dec!(3.80)),
    ];

    let err = select_best_odds(&quotes, &one_x_two()).unwrap_err();

    assert_eq!(
        err,
        EngineError::MissingOutcome {
            outcome: OutcomeKey::from("2")
        }
    );
    assert_eq!(err.code(), "incomplete_odds");
}

#[test]
fn odds_at_or_below_one_are_rejected() {
    for bad in [dec!(1.0), dec!(0.5)] {
        let best = vec![quote("Superbet", "1", bad), quote("MaxBet", "2", dec!(3.00))];

        let err = compute_arbitrage(&best, dec!(100)).unwrap_err();

        assert!(
            matches!(err, EngineError::InvalidOdds { ref bookmaker, odds, .. } if bookmaker == "Superbet" && odds == bad),
            "unexpected error {:?}",
            err
        );
    }
}

#[test]
fn result_serializes_with_legacy_field_names() {
    let best = vec![
        quote("Superbet", "1", dec!(2.10)),
        quote("MaxBet", "X", dec!(3.80)),
        quote("Spin.ro", "2", dec!(4.20)),
    ];
    let result = compute_arbitrage(&best, dec!(100)).unwrap();

    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["arbitrageExists"], json!(true));
    let first = &value["bets"][0];
    assert_eq!(first["bookmaker"], json!("Superbet"));
    assert_eq!(first["type"], json!("1"));
    assert!(first.get("stakeAmount").is_some());
    assert!(first.get("potentialReturn").is_some());
    assert!(first.get("kellyPercentage").is_some());
    assert!(value.get("sumOfProbabilities").is_some());
    assert!(value.get("expectedROI").is_some());
}

#[test]
fn store_ingest_feeds_match_analysis() {
    let store = OddsStore::with_sample_data();

    let before = analyze_match(&store.odds_for("1").unwrap(), dec!(100)).unwrap();
    assert!(!before.result.arbitrage_exists);

    store
        .upsert_odds(
            "1",
            BookmakerOdds::new("Betano", dec!(2.60), dec!(3.90), dec!(4.10)),
        )
        .unwrap();

    let after = analyze_match(&store.odds_for("1").unwrap(), dec!(100)).unwrap();
    assert!(after.result.arbitrage_exists);
    assert_eq!(after.best_odds[0].bookmaker, "Betano");
}

#[test]
fn sample_arbitrage_match_is_profitable() {
    let store = OddsStore::with_sample_data();
    let rows = store.odds_for(SAMPLE_ARBITRAGE_MATCH_ID).unwrap();

    let analysis = analyze_match(&rows, dec!(1000)).unwrap();

    assert!(analysis.result.arbitrage_exists);
    assert!(analysis.result.expected_profit > Decimal::ZERO);
    assert_eq!(analysis.result.total_stake(), dec!(1000));
    assert_eq!(analysis.result.total_allocation_pct(), dec!(100));
}

#[test]
fn match_without_odds_is_incomplete() {
    let err = analyze_match(&[], dec!(100)).unwrap_err();

    assert_eq!(
        err,
        EngineError::MissingOutcome {
            outcome: OutcomeKey::from(MatchOutcome::HomeWin)
        }
    );
}
