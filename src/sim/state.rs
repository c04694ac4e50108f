//! Round state and core simulation types
//!
//! Everything a round needs lives here and is mutated only by `tick`.

use std::time::Duration;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entities::{Bullet, Obstacle, Owner, Tank};
use super::level::{LevelTuning, generate_level};
use crate::config::{Difficulty, DifficultyBundle, GameConfig};
use crate::error::ConfigError;
use crate::scoring::{RatingInput, calculate_rating};

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Difficulty selection and leaderboard. Session-level only: reported by
    /// `Game::phase` when no round exists. A `RoundState` never holds it.
    Menu,
    /// Active gameplay
    Playing,
    /// Pause between a cleared level and the next one
    LevelTransition,
    /// All levels cleared
    Victory,
    /// Out of lives
    Defeat,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::Victory | GamePhase::Defeat)
    }
}

/// Things that happened during a tick, for logging and presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelStarted { level: u32 },
    PlayerFired,
    EnemyFired,
    ObstacleDestroyed,
    EnemyDestroyed { remaining: usize },
    PlayerHit { lives_left: u32 },
    LevelCleared { level: u32 },
    RoundEnded { victory: bool },
}

/// Cumulative round statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStats {
    pub kills: u32,
    pub deaths: u32,
    pub shots: u32,
}

/// Final numbers for a finished round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub difficulty: Difficulty,
    pub level_reached: u32,
    pub victory: bool,
    /// Seconds since round start, floored at 1.0
    pub elapsed_sec: f64,
    pub stats: RoundStats,
    pub rating: f64,
}

/// Complete state of one round
#[derive(Debug, Clone)]
pub struct RoundState {
    pub config: GameConfig,
    pub difficulty: Difficulty,
    /// Seed of the AI decision stream
    pub seed: u64,
    pub(crate) ai_rng: Pcg32,
    /// Current level (1-based)
    pub level: u32,
    pub lives: u32,
    pub phase: GamePhase,
    /// Simulation time since round start
    pub clock: Duration,
    /// When the current level transition ends
    pub transition_until: Duration,
    /// Player cannot be hit before this time
    pub invincible_until: Duration,
    pub player: Tank,
    pub enemies: Vec<Tank>,
    pub bullets: Vec<Bullet>,
    pub obstacles: Vec<Obstacle>,
    pub stats: RoundStats,
    /// Set once the result has been written to the store
    pub result_saved: bool,
    /// Present once the round reached Victory or Defeat
    pub summary: Option<RoundSummary>,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
}

impl RoundState {
    /// Start a round at level 1 with the given AI seed. The config is
    /// validated first; the level generator assumes valid bounds.
    pub fn new(config: GameConfig, difficulty: Difficulty, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let bundle = config.difficulty(difficulty).clone();
        let spawn = config.arena.player_spawn();
        let mut state = Self {
            lives: config.player_lives,
            config,
            difficulty,
            seed,
            ai_rng: Pcg32::seed_from_u64(seed),
            level: 1,
            phase: GamePhase::Playing,
            clock: Duration::ZERO,
            transition_until: Duration::ZERO,
            invincible_until: Duration::ZERO,
            player: Tank::player(spawn, bundle.player_speed),
            enemies: Vec::new(),
            bullets: Vec::new(),
            obstacles: Vec::new(),
            stats: RoundStats::default(),
            result_saved: false,
            summary: None,
            events: Vec::new(),
        };
        state.start_level(1);
        Ok(state)
    }

    pub fn bundle(&self) -> &DifficultyBundle {
        self.config.difficulty(self.difficulty)
    }

    pub fn tuning(&self) -> LevelTuning {
        LevelTuning::new(self.bundle(), self.level)
    }

    /// Lay out `level` and put the player back at the spawn point
    pub fn start_level(&mut self, level: u32) {
        self.level = level;
        let tuning = self.tuning();
        let layout = generate_level(level, tuning.enemy_count, &self.config.arena);

        self.player = Tank::player(self.config.arena.player_spawn(), self.bundle().player_speed);
        self.obstacles = layout.obstacles;
        let now = self.clock;
        let rng = &mut self.ai_rng;
        self.enemies = layout
            .enemy_spawns
            .into_iter()
            .map(|pos| Tank::enemy(pos, tuning.enemy_speed, now, &mut *rng))
            .collect();
        self.bullets.clear();
        self.invincible_until = now + self.respawn_invincibility();

        log::info!(
            "Level {} started: {} enemies, {} obstacles",
            level,
            self.enemies.len(),
            self.obstacles.len()
        );
        self.events.push(GameEvent::LevelStarted { level });
    }

    pub fn respawn_invincibility(&self) -> Duration {
        Duration::from_millis(self.config.respawn_invincible_ms)
    }

    pub fn is_invincible(&self) -> bool {
        self.clock < self.invincible_until
    }

    pub fn player_bullet_count(&self) -> usize {
        self.bullets
            .iter()
            .filter(|b| b.owner == Owner::Player)
            .count()
    }

    /// Seconds since round start, floored at 1.0
    pub fn elapsed_sec(&self) -> f64 {
        self.clock.as_secs_f64().max(1.0)
    }

    /// Rating the round would get if it ended now
    pub fn current_rating(&self, victory: bool) -> f64 {
        calculate_rating(
            &self.config,
            self.difficulty,
            &RatingInput {
                elapsed_sec: self.elapsed_sec(),
                kills: self.stats.kills,
                shots: self.stats.shots,
                deaths: self.stats.deaths,
                victory,
            },
        )
    }

    /// Enter Victory or Defeat and freeze the round summary
    pub(crate) fn finish(&mut self, victory: bool) {
        self.phase = if victory {
            GamePhase::Victory
        } else {
            GamePhase::Defeat
        };
        let summary = RoundSummary {
            difficulty: self.difficulty,
            level_reached: self.level,
            victory,
            elapsed_sec: self.elapsed_sec(),
            stats: self.stats,
            rating: self.current_rating(victory),
        };
        log::info!(
            "Round over ({}): level {}, kills {}, deaths {}, shots {}, rating {:.2}",
            if victory { "victory" } else { "defeat" },
            summary.level_reached,
            summary.stats.kills,
            summary.stats.deaths,
            summary.stats.shots,
            summary.rating
        );
        self.summary = Some(summary);
        self.events.push(GameEvent::RoundEnded { victory });
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
