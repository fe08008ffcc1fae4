//! Odds-related types for football 1X2 markets.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;

use crate::error::EngineError;

/// Stable key identifying one outcome of an event.
///
/// Football matches use `"1"`, `"X"` and `"2"`; the manual calculator accepts
/// any label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeKey(String);

impl OutcomeKey {
    /// Create a key from any label.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OutcomeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for OutcomeKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for OutcomeKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<MatchOutcome> for OutcomeKey {
    fn from(outcome: MatchOutcome) -> Self {
        Self(outcome.to_string())
    }
}

/// Result of a football match.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Home team wins (1).
    #[strum(to_string = "1", serialize = "home_win", serialize = "home")]
    HomeWin,
    /// Draw (X).
    #[strum(to_string = "X", serialize = "x", serialize = "draw")]
    Draw,
    /// Away team wins (2).
    #[strum(to_string = "2", serialize = "away_win", serialize = "away")]
    AwayWin,
}

impl MatchOutcome {
    /// All outcomes in 1/X/2 order.
    pub const ALL: [MatchOutcome; 3] = [MatchOutcome::HomeWin, MatchOutcome::Draw, MatchOutcome::AwayWin];

    /// Outcome keys in 1/X/2 order.
    pub fn keys() -> Vec<OutcomeKey> {
        Self::ALL.iter().copied().map(OutcomeKey::from).collect()
    }

    /// Human-readable label, e.g. "Liverpool Win (1)".
    pub fn label(&self, team1: &str, team2: &str) -> String {
        match self {
            MatchOutcome::HomeWin => format!("{} Win (1)", team1),
            MatchOutcome::Draw => "Draw (X)".to_string(),
            MatchOutcome::AwayWin => format!("{} Win (2)", team2),
        }
    }
}

/// A single bookmaker's price for one outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OddsQuote {
    /// Bookmaker offering the price.
    pub bookmaker: String,
    /// Outcome the price is for.
    #[serde(rename = "type")]
    pub outcome: OutcomeKey,
    /// Decimal odds (payout multiplier, must be > 1.0).
    #[serde(with = "rust_decimal::serde::float")]
    pub odds: Decimal,
}

impl OddsQuote {
    /// Create a new quote.
    pub fn new(bookmaker: impl Into<String>, outcome: impl Into<OutcomeKey>, odds: Decimal) -> Self {
        Self {
            bookmaker: bookmaker.into(),
            outcome: outcome.into(),
            odds,
        }
    }

    /// Reject odds that are not strictly greater than 1.0.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.odds <= Decimal::ONE {
            return Err(EngineError::InvalidOdds {
                bookmaker: self.bookmaker.clone(),
                outcome: self.outcome.clone(),
                odds: self.odds,
            });
        }
        Ok(())
    }
}

/// One bookmaker's 1X2 prices for a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmakerOdds {
    /// Bookmaker name.
    pub bookmaker: String,
    /// Home win price.
    #[serde(with = "rust_decimal::serde::float")]
    pub home_win: Decimal,
    /// Draw price.
    #[serde(with = "rust_decimal::serde::float")]
    pub draw: Decimal,
    /// Away win price.
    #[serde(with = "rust_decimal::serde::float")]
    pub away_win: Decimal,
    /// When the prices were last refreshed.
    #[serde(with = "time::serde::rfc3339", default = "OffsetDateTime::now_utc")]
    pub updated_at: OffsetDateTime,
}

impl BookmakerOdds {
    /// Create a row stamped with the current time.
    pub fn new(bookmaker: impl Into<String>, home_win: Decimal, draw: Decimal, away_win: Decimal) -> Self {
        Self {
            bookmaker: bookmaker.into(),
            home_win,
            draw,
            away_win,
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    /// Price for a given outcome.
    pub fn odds_for(&self, outcome: MatchOutcome) -> Decimal {
        match outcome {
            MatchOutcome::HomeWin => self.home_win,
            MatchOutcome::Draw => self.draw,
            MatchOutcome::AwayWin => self.away_win,
        }
    }

    /// Flatten into one quote per outcome, in 1/X/2 order.
    pub fn quotes(&self) -> Vec<OddsQuote> {
        MatchOutcome::ALL
            .iter()
            .map(|&outcome| OddsQuote::new(self.bookmaker.clone(), outcome, self.odds_for(outcome)))
            .collect()
    }

    /// Check every price is a valid decimal odds value.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.quotes().iter().try_for_each(OddsQuote::validate)
    }
}

/// A football fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootballMatch {
    /// Match identifier.
    pub id: String,
    /// Home team.
    pub team1: String,
    /// Away team.
    pub team2: String,
    /// Kick-off time.
    #[serde(with = "time::serde::rfc3339")]
    pub match_date: OffsetDateTime,
    /// Competition name.
    pub league: String,
}

impl FootballMatch {
    /// Label for an outcome of this match.
    pub fn outcome_label(&self, outcome: MatchOutcome) -> String {
        outcome.label(&self.team1, &self.team2)
    }

    /// Case-insensitive search against teams and league.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        [&self.team1, &self.team2, &self.league]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}
