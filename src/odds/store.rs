//! In-memory odds store keyed by match id.

use std::path::Path;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::types::{BookmakerOdds, FootballMatch};
use crate::error::StoreError;
use crate::metrics;

/// A fixture together with every bookmaker's latest prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEntry {
    /// Fixture details.
    #[serde(flatten)]
    pub fixture: FootballMatch,
    /// One row per bookmaker.
    #[serde(default)]
    pub odds: Vec<BookmakerOdds>,
}

impl MatchEntry {
    /// Fixture with no odds yet.
    pub fn new(fixture: FootballMatch) -> Self {
        Self {
            fixture,
            odds: Vec::new(),
        }
    }

    /// Replace the bookmaker's row, or append it if unseen.
    fn upsert(&mut self, row: BookmakerOdds) {
        match self.odds.iter_mut().find(|r| r.bookmaker == row.bookmaker) {
            Some(existing) => *existing = row,
            None => self.odds.push(row),
        }
    }
}

/// Concurrent store of matches and their bookmaker odds.
///
/// Readers get cloned snapshots, so a computation never observes a row
/// changing underneath it.
#[derive(Debug, Default)]
pub struct OddsStore {
    matches: DashMap<String, MatchEntry>,
}

impl OddsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with the built-in sample fixtures.
    pub fn with_sample_data() -> Self {
        let store = Self::new();
        for entry in super::sample::sample_entries() {
            store.insert_entry(entry);
        }
        store
    }

    /// Number of matches.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether the store holds no matches.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Insert or replace a fixture, keeping any odds already recorded for it.
    pub fn insert_match(&self, fixture: FootballMatch) {
        self.matches
            .entry(fixture.id.clone())
            .and_modify(|entry| entry.fixture = fixture.clone())
            .or_insert_with(|| MatchEntry::new(fixture));
    }

    /// Insert or replace a full entry.
    pub fn insert_entry(&self, entry: MatchEntry) {
        self.matches.insert(entry.fixture.id.clone(), entry);
    }

    /// Snapshot of one match.
    pub fn get_match(&self, id: &str) -> Result<MatchEntry, StoreError> {
        self.matches
            .get(id)
            .map(|e| e.clone())
            .ok_or_else(|| StoreError::MatchNotFound { id: id.to_string() })
    }

    /// Snapshot of one match's bookmaker rows.
    pub fn odds_for(&self, id: &str) -> Result<Vec<BookmakerOdds>, StoreError> {
        self.get_match(id).map(|e| e.odds)
    }

    /// Fixtures ordered by kick-off, optionally filtered by a search query.
    pub fn list_matches(&self, query: Option<&str>) -> Vec<FootballMatch> {
        let mut fixtures: Vec<FootballMatch> = self
            .matches
            .iter()
            .map(|e| e.fixture.clone())
            .filter(|m| query.map_or(true, |q| m.matches_query(q)))
            .collect();
        fixtures.sort_by(|a, b| a.match_date.cmp(&b.match_date).then_with(|| a.id.cmp(&b.id)));
        fixtures
    }

    /// Record a bookmaker's latest prices for a match.
    ///
    /// Rows with any odds <= 1.0 are rejected and leave the store untouched.
    #[instrument(skip(self, row), fields(bookmaker = %row.bookmaker))]
    pub fn upsert_odds(&self, id: &str, row: BookmakerOdds) -> Result<(), StoreError> {
        row.validate()?;

        let mut entry = self
            .matches
            .get_mut(id)
            .ok_or_else(|| StoreError::MatchNotFound { id: id.to_string() })?;
        entry.upsert(row);
        metrics::inc_odds_upserts();

        debug!(bookmakers = entry.odds.len(), "Odds updated");
        Ok(())
    }

    /// Remove a match and its odds.
    pub fn remove_match(&self, id: &str) -> Option<MatchEntry> {
        self.matches.remove(id).map(|(_, entry)| entry)
    }

    /// Load fixtures and odds from a JSON seed file.
    ///
    /// The file holds an array of entries. Every odds row is validated before
    /// anything is inserted.
    pub fn load_seed(&self, path: impl AsRef<Path>) -> Result<usize, StoreError> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        let raw = std::fs::read_to_string(path).map_err(|source| StoreError::SeedRead {
            path: shown.clone(),
            source,
        })?;
        let entries: Vec<MatchEntry> =
            serde_json::from_str(&raw).map_err(|source| StoreError::SeedParse {
                path: shown.clone(),
                source,
            })?;

        for row in entries.iter().flat_map(|e| e.odds.iter()) {
            row.validate()?;
        }

        let count = entries.len();
        for entry in entries {
            self.insert_entry(entry);
        }

        info!(path = %shown, matches = count, "Seed file loaded");
        Ok(count)
    }
}
