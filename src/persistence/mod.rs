//! Round result persistence
//!
//! Results are append-only records. A store assigns each record an id and a
//! `played_at` timestamp, and answers leaderboard queries:
//! - `top_results`: best records, optionally for one difficulty
//! - `best_rating`: highest rating, or 0.0 when there are none
//!
//! Two stores are provided: `MemoryStore` (tests, throwaway sessions) and
//! `JsonLinesStore` (one JSON record per line in a local file).

mod json_lines;
mod memory;

pub use json_lines::JsonLinesStore;
pub use memory::MemoryStore;

use std::cmp::Ordering;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::config::Difficulty;
use crate::error::StoreError;
use crate::sim::RoundSummary;

/// Storage port for finished rounds
pub trait ResultStore {
    /// Append one record, assigning its id and timestamp
    fn add_result(&mut self, result: NewResult) -> Result<(), StoreError>;

    /// Up to `limit` records, best first, optionally for one difficulty
    fn top_results(
        &self,
        limit: usize,
        difficulty: Option<Difficulty>,
    ) -> Result<Vec<RoundResult>, StoreError>;

    /// Highest rating recorded (0.0 if none match)
    fn best_rating(&self, difficulty: Option<Difficulty>) -> Result<f64, StoreError>;
}

/// Source of record timestamps
pub trait Clock {
    fn now_unix_ms(&self) -> u64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// A finished round, before the store has assigned id and timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewResult {
    pub player_name: String,
    pub difficulty: Difficulty,
    pub level_reached: u32,
    pub victory: bool,
    pub play_time_sec: f64,
    pub kills: u32,
    pub deaths: u32,
    pub bullets_used: u32,
    pub rating: f64,
}

impl NewResult {
    /// Build a record from a round summary
    pub fn from_summary(player_name: &str, summary: &RoundSummary) -> Self {
        Self {
            player_name: player_name.to_string(),
            difficulty: summary.difficulty,
            level_reached: summary.level_reached,
            victory: summary.victory,
            play_time_sec: summary.elapsed_sec,
            kills: summary.stats.kills,
            deaths: summary.stats.deaths,
            bullets_used: summary.stats.shots,
            rating: summary.rating,
        }
    }
}

/// A stored round result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub id: u64,
    /// Unix time in milliseconds
    pub played_at: u64,
    pub player_name: String,
    pub difficulty: Difficulty,
    pub level_reached: u32,
    /// Stored as 0/1
    #[serde(with = "flag")]
    pub victory: bool,
    pub play_time_sec: f64,
    pub kills: u32,
    pub deaths: u32,
    pub bullets_used: u32,
    pub rating: f64,
}

impl RoundResult {
    pub fn new(id: u64, played_at: u64, result: NewResult) -> Self {
        Self {
            id,
            played_at,
            player_name: result.player_name,
            difficulty: result.difficulty,
            level_reached: result.level_reached,
            victory: result.victory,
            play_time_sec: result.play_time_sec,
            kills: result.kills,
            deaths: result.deaths,
            bullets_used: result.bullets_used,
            rating: result.rating,
        }
    }

    fn matches(&self, difficulty: Option<Difficulty>) -> bool {
        difficulty.is_none_or(|d| self.difficulty == d)
    }
}

/// Leaderboard order: rating desc, kills desc, play time asc, then oldest first
pub fn leaderboard_order(a: &RoundResult, b: &RoundResult) -> Ordering {
    b.rating
        .total_cmp(&a.rating)
        .then_with(|| b.kills.cmp(&a.kills))
        .then_with(|| a.play_time_sec.total_cmp(&b.play_time_sec))
        .then_with(|| a.played_at.cmp(&b.played_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Filter, sort and truncate a set of records
pub(crate) fn rank<'a>(
    records: impl IntoIterator<Item = &'a RoundResult>,
    limit: usize,
    difficulty: Option<Difficulty>,
) -> Vec<RoundResult> {
    let mut ranked: Vec<RoundResult> = records
        .into_iter()
        .filter(|r| r.matches(difficulty))
        .cloned()
        .collect();
    ranked.sort_by(leaderboard_order);
    ranked.truncate(limit);
    ranked
}

/// Highest rating among matching records
pub(crate) fn best<'a>(
    records: impl IntoIterator<Item = &'a RoundResult>,
    difficulty: Option<Difficulty>,
) -> f64 {
    records
        .into_iter()
        .filter(|r| r.matches(difficulty))
        .map(|r| r.rating)
        .fold(0.0, f64::max)
}

/// bool <-> 0/1
mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(u8::deserialize(deserializer)? != 0)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::result;
    use super::*;

    #[test]
    fn test_order_breaks_ties() {
        let mut records = vec![
            RoundResult::new(1, 100, result("slow", Difficulty::Hard, true, 20, 0, 90.0, 8.0)),
            RoundResult::new(2, 100, result("fast", Difficulty::Hard, true, 20, 0, 60.0, 8.0)),
            RoundResult::new(3, 100, result("more", Difficulty::Hard, true, 25, 0, 99.0, 8.0)),
            RoundResult::new(4, 100, result("best", Difficulty::Hard, true, 1, 0, 99.0, 9.0)),
            RoundResult::new(5, 50, result("older", Difficulty::Hard, true, 20, 0, 60.0, 8.0)),
        ];
        records.sort_by(leaderboard_order);
        let names: Vec<_> = records.iter().map(|r| r.player_name.as_str()).collect();
        assert_eq!(names, ["best", "more", "older", "fast", "slow"]);
    }

    #[test]
    fn test_rank_filters_and_limits() {
        let records: Vec<_> = (0..6)
            .map(|i| {
                let d = if i % 2 == 0 { Difficulty::Easy } else { Difficulty::Medium };
                RoundResult::new(i, i, result("p", d, false, i as u32, 3, 30.0, i as f64))
            })
            .collect();
        let easy = rank(&records, 2, Some(Difficulty::Easy));
        assert_eq!(easy.len(), 2);
        assert!(easy.iter().all(|r| r.difficulty == Difficulty::Easy));
        assert_eq!(easy[0].rating, 4.0);
        assert_eq!(best(&records, Some(Difficulty::Medium)), 5.0);
        assert_eq!(best(&records[..0], None), 0.0);
    }

    #[test]
    fn test_record_shape() {
        let record = RoundResult::new(
            7,
            1_700_000_000_000,
            result("bob", Difficulty::Hard, true, 30, 1, 110.2, 9.8),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["difficulty"], "hard");
        assert_eq!(json["victory"], 1);
        assert_eq!(json["bullets_used"], 60);

        let back: RoundResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
