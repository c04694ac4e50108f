//! Bullets, obstacles and tanks with their per-entity update rules

use std::time::Duration;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rect::{Arena, Rect};
use crate::consts::*;
use crate::{CARDINALS, DOWN, UP};

/// Which side fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// A bullet in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    /// Unit travel direction
    pub dir: Vec2,
    pub owner: Owner,
}

impl Bullet {
    pub fn new(pos: Vec2, dir: Vec2, owner: Owner) -> Self {
        Self { pos, dir, owner }
    }

    /// Advance one frame
    pub fn update(&mut self, speed: f32) {
        self.pos += self.dir * speed;
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, Vec2::splat(BULLET_SIZE))
    }

    pub fn offscreen(&self, arena: &Arena) -> bool {
        !arena.contains(self.pos)
    }
}

/// Obstacle materials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Breaks after `BRICK_HP` hits
    Brick,
    /// Indestructible
    Steel,
}

/// A static tile obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub rect: Rect,
    pub kind: ObstacleKind,
    pub hp: u8,
}

impl Obstacle {
    pub fn new(rect: Rect, kind: ObstacleKind) -> Self {
        let hp = match kind {
            ObstacleKind::Brick => BRICK_HP,
            ObstacleKind::Steel => u8::MAX, // Never decremented
        };
        Self { rect, kind, hp }
    }

    /// Register a bullet hit. Returns true if the obstacle is destroyed.
    pub fn hit(&mut self) -> bool {
        match self.kind {
            ObstacleKind::Steel => false,
            ObstacleKind::Brick => {
                self.hp = self.hp.saturating_sub(1);
                self.hp == 0
            }
        }
    }
}

/// Who decides where a tank goes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Control {
    /// Driven by player input
    Player,
    /// Wanders and hunts the player on a randomized re-aim timer
    Autonomous { next_turn_at: Duration },
}

/// A tank (player or enemy)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    /// Body center
    pub pos: Vec2,
    /// Unit facing; bullets leave along it
    pub facing: Vec2,
    /// Travel per frame
    pub speed: f32,
    /// Clock time of the last shot (None = never fired)
    pub last_fire: Option<Duration>,
    pub control: Control,
}

impl Tank {
    /// Chance an AI re-aim steers straight at the player
    pub const HUNT_CHANCE: f32 = 0.58;
    /// Range of the AI re-aim timer (ms, inclusive)
    pub const TURN_INTERVAL_MS: (u64, u64) = (280, 900);

    pub fn player(pos: Vec2, speed: f32) -> Self {
        Self {
            pos,
            facing: UP,
            speed,
            last_fire: None,
            control: Control::Player,
        }
    }

    /// Enemy tank whose first re-aim happens after a random delay from `now`
    pub fn enemy<R: Rng + ?Sized>(pos: Vec2, speed: f32, now: Duration, rng: &mut R) -> Self {
        Self {
            pos,
            facing: UP,
            speed,
            last_fire: None,
            control: Control::Autonomous {
                next_turn_at: now + Self::turn_delay(rng),
            },
        }
    }

    fn turn_delay<R: Rng + ?Sized>(rng: &mut R) -> Duration {
        let (lo, hi) = Self::TURN_INTERVAL_MS;
        Duration::from_millis(rng.random_range(lo..=hi))
    }

    pub fn half_extent() -> Vec2 {
        Vec2::splat(TANK_SIZE / 2.0)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, Vec2::splat(TANK_SIZE))
    }

    /// Move along `vector` at this tank's speed, facing the way it moves.
    /// Zero vectors are ignored.
    pub fn move_by(&mut self, vector: Vec2, arena: &Arena) {
        let Some(dir) = vector.try_normalize() else {
            return;
        };
        self.facing = dir;
        self.pos += dir * self.speed;
        self.pos = arena.clamp_center(self.pos, Self::half_extent());
    }

    pub fn can_fire(&self, cooldown: Duration, now: Duration) -> bool {
        match self.last_fire {
            None => true,
            Some(last) => now.saturating_sub(last) >= cooldown,
        }
    }

    /// Fire along the current facing
    pub fn fire(&mut self, owner: Owner, now: Duration) -> Bullet {
        self.last_fire = Some(now);
        Bullet::new(self.pos + self.facing * MUZZLE_OFFSET, self.facing, owner)
    }

    /// Turn to face a point (keeps the current facing if already there)
    pub fn face_toward(&mut self, target: Vec2) {
        if let Some(dir) = (target - self.pos).try_normalize() {
            self.facing = dir;
        }
    }

    /// Autonomous update: re-aim when the timer is due, drive forward, and
    /// bounce off arena walls. No-op for player-controlled tanks.
    pub fn think<R: Rng + ?Sized>(
        &mut self,
        target: Vec2,
        now: Duration,
        arena: &Arena,
        rng: &mut R,
    ) {
        let Control::Autonomous { next_turn_at } = self.control else {
            return;
        };

        if now >= next_turn_at {
            self.facing = if rng.random::<f32>() < Self::HUNT_CHANCE {
                (target - self.pos).try_normalize().unwrap_or(DOWN)
            } else {
                random_cardinal(rng)
            };
            self.control = Control::Autonomous {
                next_turn_at: now + Self::turn_delay(rng),
            };
        }

        self.move_by(self.facing, arena);

        let half = Self::half_extent();
        if self.pos.x <= half.x || self.pos.x >= arena.width - half.x {
            self.facing.x = -self.facing.x;
        }
        if self.pos.y <= half.y || self.pos.y >= arena.height - half.y {
            self.facing.y = -self.facing.y;
        }
    }
}

/// One of the four cardinal directions, uniformly
pub fn random_cardinal<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    CARDINALS[rng.random_range(0..CARDINALS.len())]
}
