//! Leaderboard shown in the menu
//!
//! A cached view of the result store for one difficulty. Refreshed when the
//! menu opens, the selection changes, or a round result is stored.

use crate::config::{Difficulty, GameConfig};
use crate::error::StoreError;
use crate::persistence::{ResultStore, RoundResult};

/// Width of the name column
const NAME_WIDTH: usize = 10;

/// Top results and best rating for one difficulty
#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    pub difficulty: Difficulty,
    /// Best first
    pub entries: Vec<RoundResult>,
    pub best_rating: f64,
    /// Rating cap the rows are shown against
    pub rating_cap: f64,
}

impl Leaderboard {
    /// Empty board for a difficulty
    pub fn new(difficulty: Difficulty, rating_cap: f64) -> Self {
        Self {
            difficulty,
            entries: Vec::new(),
            best_rating: 0.0,
            rating_cap,
        }
    }

    /// Query the store for `difficulty`
    pub fn load<S: ResultStore + ?Sized>(
        store: &S,
        config: &GameConfig,
        difficulty: Difficulty,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            difficulty,
            entries: store.top_results(config.leaderboard_limit, Some(difficulty))?,
            best_rating: store.best_rating(Some(difficulty))?,
            rating_cap: config.rating_cap(difficulty),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Would a rating make it onto a board of `limit` rows?
    pub fn qualifies(&self, rating: f64, limit: usize) -> bool {
        if limit == 0 {
            return false;
        }
        if self.entries.len() < limit {
            return true;
        }
        self.entries.last().is_none_or(|e| rating > e.rating)
    }

    pub fn title(&self) -> String {
        format!("Leaderboard ({})", self.difficulty.label())
    }

    pub fn best_line(&self) -> String {
        format!(
            "{} Top Rating: {:.2}/{:.1}",
            self.difficulty.label(),
            self.best_rating,
            self.rating_cap
        )
    }

    /// One row per entry, ranked from 1
    pub fn lines(&self) -> Vec<String> {
        if self.entries.is_empty() {
            return vec!["No records yet. Play one round to create rankings.".to_string()];
        }
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| format_entry(i + 1, e, self.rating_cap))
            .collect()
    }
}

/// Format a leaderboard row: ` 1. name       9.80/10.0 K:30 D:1  T:110.2s`
pub fn format_entry(rank: usize, entry: &RoundResult, rating_cap: f64) -> String {
    let name: String = entry.player_name.chars().take(NAME_WIDTH).collect();
    format!(
        "{:>2}. {:<width$} {:>4.2}/{:.1} K:{:<2} D:{:<2} T:{:>5.1}s",
        rank,
        name,
        entry.rating,
        rating_cap,
        entry.kills,
        entry.deaths,
        entry.play_time_sec,
        width = NAME_WIDTH
    )
}
