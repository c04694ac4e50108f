//! Game balance and configuration
//!
//! Loaded once at startup. Every field has a default, so a JSON file only needs
//! to name the values it overrides.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::Arena;

/// Difficulty selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Stable key used in stores and config files
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Human-readable name for menus and summaries
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_key(key: &str) -> Result<Self, ConfigError> {
        match key.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "med" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigError::UnknownDifficulty(key.to_string())),
        }
    }

    /// Menu hotkey index (1, 2, 3)
    pub fn from_menu_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Difficulty::Easy),
            2 => Some(Difficulty::Medium),
            3 => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::from_key(s)
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunable constants for one difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyBundle {
    pub label: String,
    /// Player travel per frame
    pub player_speed: f32,
    /// Enemy travel per frame at level 1
    pub enemy_speed: f32,
    pub player_fire_cd_ms: u64,
    /// Enemy cooldown at level 1 (shrinks with level)
    pub enemy_fire_cd_ms: u64,
    /// Per-frame fire roll at level 1 (grows with level)
    pub enemy_fire_chance: f32,
    /// Live player bullets allowed at once
    pub max_player_bullets: usize,
    /// Enemies on level 1 (one more per level after)
    pub base_enemy_count: usize,
    /// Highest rating reachable on this difficulty
    pub rating_cap: f64,
}

impl DifficultyBundle {
    pub fn easy() -> Self {
        Self {
            label: "Easy".to_string(),
            player_speed: 4.8,
            enemy_speed: 1.1,
            player_fire_cd_ms: 200,
            enemy_fire_cd_ms: 1750,
            enemy_fire_chance: 0.008,
            max_player_bullets: 6,
            base_enemy_count: 3,
            rating_cap: 7.5,
        }
    }

    pub fn medium() -> Self {
        Self {
            label: "Medium".to_string(),
            player_speed: 4.2,
            enemy_speed: 1.4,
            player_fire_cd_ms: 260,
            enemy_fire_cd_ms: 1400,
            enemy_fire_chance: 0.012,
            max_player_bullets: 5,
            base_enemy_count: 4,
            rating_cap: 9.0,
        }
    }

    pub fn hard() -> Self {
        Self {
            label: "Hard".to_string(),
            player_speed: 3.8,
            enemy_speed: 1.8,
            player_fire_cd_ms: 300,
            enemy_fire_cd_ms: 1000,
            enemy_fire_chance: 0.018,
            max_player_bullets: 4,
            base_enemy_count: 5,
            rating_cap: 10.0,
        }
    }

    fn validate(&self, key: Difficulty) -> Result<(), ConfigError> {
        let invalid = |what: &str| Err(ConfigError::Invalid(format!("{key}: {what}")));
        if self.player_speed <= 0.0 || self.enemy_speed <= 0.0 {
            return invalid("speeds must be positive");
        }
        if !(0.0..=1.0).contains(&self.enemy_fire_chance) {
            return invalid("enemy_fire_chance must be within [0, 1]");
        }
        if self.max_player_bullets == 0 {
            return invalid("max_player_bullets must be at least 1");
        }
        if self.rating_cap <= 0.0 {
            return invalid("rating_cap must be positive");
        }
        Ok(())
    }
}

/// Bundles for every difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTable {
    pub easy: DifficultyBundle,
    pub medium: DifficultyBundle,
    pub hard: DifficultyBundle,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: DifficultyBundle::easy(),
            medium: DifficultyBundle::medium(),
            hard: DifficultyBundle::hard(),
        }
    }
}

impl DifficultyTable {
    pub fn get(&self, difficulty: Difficulty) -> &DifficultyBundle {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }
}

/// Rating targets and component weights (weights sum to 1.0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub target_kills: u32,
    pub target_time_sec: f64,
    pub w_kills: f64,
    pub w_accuracy: f64,
    pub w_time: f64,
    pub w_survival: f64,
    pub w_victory_bonus: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            target_kills: 30,
            target_time_sec: 220.0,
            w_kills: 0.32,
            w_accuracy: 0.28,
            w_time: 0.20,
            w_survival: 0.10,
            w_victory_bonus: 0.10,
        }
    }
}

impl ScoringConfig {
    pub fn weight_sum(&self) -> f64 {
        self.w_kills + self.w_accuracy + self.w_time + self.w_survival + self.w_victory_bonus
    }
}

/// Static game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub arena: Arena,
    pub fps: u32,
    pub total_levels: u32,
    pub player_lives: u32,
    pub respawn_invincible_ms: u64,
    pub level_transition_ms: u64,
    pub bullet_speed: f32,
    pub difficulties: DifficultyTable,
    pub scoring: ScoringConfig,
    pub leaderboard_limit: usize,
    pub default_player_name: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena: Arena::new(ARENA_WIDTH, ARENA_HEIGHT),
            fps: FPS,
            total_levels: TOTAL_LEVELS,
            player_lives: PLAYER_LIVES,
            respawn_invincible_ms: RESPAWN_INVINCIBLE_MS,
            level_transition_ms: LEVEL_TRANSITION_MS,
            bullet_speed: BULLET_SPEED,
            difficulties: DifficultyTable::default(),
            scoring: ScoringConfig::default(),
            leaderboard_limit: LEADERBOARD_LIMIT,
            default_player_name: DEFAULT_PLAYER_NAME.to_string(),
        }
    }
}

impl GameConfig {
    /// Smallest arena the level generator can lay out
    const MIN_ARENA_EDGE: f32 = 160.0;

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config: GameConfig = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn difficulty(&self, difficulty: Difficulty) -> &DifficultyBundle {
        self.difficulties.get(difficulty)
    }

    pub fn rating_cap(&self, difficulty: Difficulty) -> f64 {
        self.difficulty(difficulty).rating_cap
    }

    /// Duration of one simulation frame
    pub fn frame_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(1) / self.fps.max(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arena.width < Self::MIN_ARENA_EDGE || self.arena.height < Self::MIN_ARENA_EDGE {
            return Err(ConfigError::Invalid(format!(
                "arena must be at least {0}x{0}",
                Self::MIN_ARENA_EDGE
            )));
        }
        if self.fps == 0 {
            return Err(ConfigError::Invalid("fps must be positive".into()));
        }
        if self.total_levels == 0 {
            return Err(ConfigError::Invalid("total_levels must be at least 1".into()));
        }
        if self.player_lives == 0 {
            return Err(ConfigError::Invalid("player_lives must be at least 1".into()));
        }
        if self.bullet_speed <= 0.0 {
            return Err(ConfigError::Invalid("bullet_speed must be positive".into()));
        }
        if self.scoring.target_kills == 0 || self.scoring.target_time_sec <= 0.0 {
            return Err(ConfigError::Invalid("scoring targets must be positive".into()));
        }
        let sum = self.scoring.weight_sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Invalid(format!(
                "scoring weights must sum to 1.0 (got {sum})"
            )));
        }
        for difficulty in Difficulty::ALL {
            self.difficulty(difficulty).validate(difficulty)?;
        }
        Ok(())
    }
}
