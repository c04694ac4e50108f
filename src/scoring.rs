//! Post-round rating
//!
//! A pure function of round statistics. Each component is clamped to [0, 1],
//! weighted, and scaled by the difficulty's cap, so easier difficulties top
//! out below the absolute maximum.

use crate::config::{Difficulty, GameConfig};
use crate::round2;

/// Statistics a rating is computed from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingInput {
    pub elapsed_sec: f64,
    pub kills: u32,
    pub shots: u32,
    pub deaths: u32,
    pub victory: bool,
}

/// Individual rating components, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingBreakdown {
    pub kill_score: f64,
    pub accuracy: f64,
    pub time_score: f64,
    pub survival: f64,
    pub victory_bonus: f64,
}

impl RatingBreakdown {
    pub fn new(config: &GameConfig, input: &RatingInput) -> Self {
        let scoring = &config.scoring;
        // One second is the practical floor so a perfect time score stays reachable
        let elapsed = input.elapsed_sec.max(1.0);
        let kills = input.kills as f64;
        Self {
            kill_score: (kills / scoring.target_kills.max(1) as f64).min(1.0),
            accuracy: (kills / input.shots.max(1) as f64).min(1.0),
            time_score: (1.0 - (elapsed - 1.0) / scoring.target_time_sec).max(0.0),
            survival: (1.0 - input.deaths as f64 / config.player_lives.max(1) as f64).max(0.0),
            victory_bonus: if input.victory { 1.0 } else { 0.0 },
        }
    }

    /// Weighted sum, nominally in [0, 1]
    pub fn weighted(&self, config: &GameConfig) -> f64 {
        let s = &config.scoring;
        self.kill_score * s.w_kills
            + self.accuracy * s.w_accuracy
            + self.time_score * s.w_time
            + self.survival * s.w_survival
            + self.victory_bonus * s.w_victory_bonus
    }
}

/// Rating in [0, cap], rounded to two decimals
pub fn calculate_rating(config: &GameConfig, difficulty: Difficulty, input: &RatingInput) -> f64 {
    let cap = config.rating_cap(difficulty);
    let weighted = RatingBreakdown::new(config, input).weighted(config);
    round2((weighted * cap).clamp(0.0, cap))
}
