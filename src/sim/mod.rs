//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (the clock is advanced by the caller's `dt`)
//! - Seeded RNG only (one stream per level layout, one per round for the AI)
//! - Stable iteration order (entities are processed in list order)
//! - No rendering, input devices or storage

pub mod autopilot;
pub mod collision;
pub mod entities;
pub mod level;
pub mod rect;
pub mod state;
pub mod tick;

pub use entities::{Bullet, Control, Obstacle, ObstacleKind, Owner, Tank};
pub use level::{LevelLayout, LevelTuning, generate_level};
pub use rect::{Arena, Rect};
pub use state::{GameEvent, GamePhase, RoundState, RoundStats, RoundSummary};
pub use tick::{HitOutcome, TickInput, hit_player, tick};
