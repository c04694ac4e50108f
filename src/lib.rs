//! Tank Battle - A tile-arena tank combat game
//!
//! Core modules:
//! - `sim`: Deterministic round simulation (entities, level layout, collisions, phases)
//! - `scoring`: Post-round rating
//! - `persistence`: Append-only round result stores
//! - `leaderboard`: Cached leaderboard view for the menu
//! - `config`: Data-driven game balance
//! - `game`: Menu/round session that ties the above together

pub mod config;
pub mod error;
pub mod game;
pub mod leaderboard;
pub mod persistence;
pub mod scoring;
pub mod sim;

pub use config::{Difficulty, DifficultyBundle, GameConfig, ScoringConfig};
pub use error::{ConfigError, StoreError};
pub use game::{FrameInput, Game};
pub use leaderboard::Leaderboard;
pub use persistence::{JsonLinesStore, MemoryStore, NewResult, ResultStore, RoundResult};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 720.0;
    pub const ARENA_HEIGHT: f32 = 520.0;

    /// Target simulation rate (frames per second)
    pub const FPS: u32 = 60;

    pub const TOTAL_LEVELS: u32 = 5;
    pub const PLAYER_LIVES: u32 = 3;
    pub const RESPAWN_INVINCIBLE_MS: u64 = 1300;
    pub const LEVEL_TRANSITION_MS: u64 = 1300;

    /// Bullet travel per frame
    pub const BULLET_SPEED: f32 = 7.6;
    /// Bullet bounding box edge
    pub const BULLET_SIZE: f32 = 6.0;

    /// Tank body edge (tanks are square)
    pub const TANK_SIZE: f32 = 36.0;
    /// Distance from tank center to where its bullets spawn
    pub const MUZZLE_OFFSET: f32 = 26.0;

    /// Obstacle grid tile edge
    pub const TILE: f32 = 32.0;
    /// Brick hit points at level start
    pub const BRICK_HP: u8 = 2;

    pub const LEADERBOARD_LIMIT: usize = 8;
    pub const DEFAULT_PLAYER_NAME: &str = "player";
    pub const MAX_PLAYER_NAME_LEN: usize = 16;
}

/// Screen-space "up" (y grows downward)
pub const UP: Vec2 = Vec2::new(0.0, -1.0);
pub const DOWN: Vec2 = Vec2::new(0.0, 1.0);
pub const LEFT: Vec2 = Vec2::new(-1.0, 0.0);
pub const RIGHT: Vec2 = Vec2::new(1.0, 0.0);

/// The four cardinal directions, in the order AI direction picks index them
pub const CARDINALS: [Vec2; 4] = [UP, DOWN, LEFT, RIGHT];

/// Round a value to two decimal places
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
