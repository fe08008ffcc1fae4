//! Built-in sample fixtures for demos and tests.
//!
//! Used when no seed file is configured, so the API has something to serve.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::macros::datetime;
use time::OffsetDateTime;

use super::store::MatchEntry;
use super::types::{BookmakerOdds, FootballMatch};

/// Bookmakers quoted in the sample data.
pub const SAMPLE_BOOKMAKERS: [&str; 3] = ["Superbet", "MaxBet", "Spin.ro"];

/// Id of the sample fixture whose best odds form an arbitrage.
pub const SAMPLE_ARBITRAGE_MATCH_ID: &str = "2";

fn entry(
    id: &str,
    team1: &str,
    team2: &str,
    match_date: OffsetDateTime,
    league: &str,
    prices: [[Decimal; 3]; 3],
) -> MatchEntry {
    let odds = SAMPLE_BOOKMAKERS
        .iter()
        .zip(prices)
        .map(|(bookmaker, [home, draw, away])| BookmakerOdds::new(*bookmaker, home, draw, away))
        .collect();

    MatchEntry {
        fixture: FootballMatch {
            id: id.to_string(),
            team1: team1.to_string(),
            team2: team2.to_string(),
            match_date,
            league: league.to_string(),
        },
        odds,
    }
}

/// Five fixtures with three bookmakers each.
pub fn sample_entries() -> Vec<MatchEntry> {
    vec![
        entry(
            "1",
            "Manchester United",
            "Liverpool",
            datetime!(2025-05-05 15:00 UTC),
            "Premier League - England",
            [
                [dec!(2.10), dec!(3.40), dec!(3.60)],
                [dec!(2.05), dec!(3.50), dec!(3.55)],
                [dec!(2.15), dec!(3.35), dec!(3.65)],
            ],
        ),
        entry(
            SAMPLE_ARBITRAGE_MATCH_ID,
            "Real Madrid",
            "Barcelona",
            datetime!(2025-05-07 20:00 UTC),
            "La Liga - Spain",
            [
                [dec!(2.30), dec!(3.60), dec!(3.20)],
                [dec!(2.45), dec!(3.50), dec!(3.05)],
                [dec!(2.35), dec!(3.90), dec!(3.10)],
            ],
        ),
        entry(
            "3",
            "Bayern Munich",
            "Borussia Dortmund",
            datetime!(2025-05-09 17:30 UTC),
            "Bundesliga - Germany",
            [
                [dec!(1.65), dec!(4.20), dec!(4.80)],
                [dec!(1.70), dec!(4.00), dec!(4.60)],
                [dec!(1.62), dec!(4.30), dec!(5.00)],
            ],
        ),
        entry(
            "4",
            "AC Milan",
            "Inter Milan",
            datetime!(2025-05-11 20:45 UTC),
            "Serie A - Italy",
            [
                [dec!(2.80), dec!(3.20), dec!(2.60)],
                [dec!(2.75), dec!(3.25), dec!(2.70)],
                [dec!(2.90), dec!(3.10), dec!(2.55)],
            ],
        ),
        entry(
            "5",
            "PSG",
            "Marseille",
            datetime!(2025-05-12 20:00 UTC),
            "Ligue 1 - France",
            [
                [dec!(1.45), dec!(4.80), dec!(6.50)],
                [dec!(1.50), dec!(4.60), dec!(6.20)],
                [dec!(1.48), dec!(5.00), dec!(6.00)],
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrage::analyze_match;

    #[test]
    fn sample_rows_are_valid() {
        for entry in sample_entries() {
            assert_eq!(entry.odds.len(), SAMPLE_BOOKMAKERS.len());
            for row in &entry.odds {
                assert!(row.validate().is_ok(), "invalid sample row {:?}", row);
            }
        }
    }

    #[test]
    fn exactly_one_sample_is_an_arbitrage() {
        let arbitrage_ids: Vec<String> = sample_entries()
            .into_iter()
            .filter(|e| analyze_match(&e.odds, dec!(100)).unwrap().result.arbitrage_exists)
            .map(|e| e.fixture.id)
            .collect();

        assert_eq!(arbitrage_ids, vec![SAMPLE_ARBITRAGE_MATCH_ID.to_string()]);
    }
}
