//! Level layout generation and per-level difficulty scaling
//!
//! Layouts are seeded from the level number alone, so a given level always
//! produces the same obstacles and enemy spawn points.

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entities::{Obstacle, ObstacleKind, Tank};
use super::rect::{Arena, Rect};
use crate::config::DifficultyBundle;
use crate::consts::TILE;

/// Enemy placement attempts before settling for fewer enemies
pub const ENEMY_SPAWN_ATTEMPTS: u32 = 4000;
/// Obstacles may not come closer than this to any arena edge
const EDGE_MARGIN: f32 = 32.0;
/// First grid row used for obstacles (rows above are the enemy entry band)
const FIRST_OBSTACLE_ROW: i32 = 3;
/// Minimum enemy cooldown regardless of level
const MIN_ENEMY_FIRE_CD_MS: u64 = 500;

/// Seed for a level's layout stream
pub fn level_seed(level: u32) -> u64 {
    level as u64 * 7919 + 17
}

/// Obstacles and enemy spawn points for one level
#[derive(Debug, Clone, PartialEq)]
pub struct LevelLayout {
    pub obstacles: Vec<Obstacle>,
    pub enemy_spawns: Vec<Vec2>,
}

/// Generate the layout for `level` with up to `enemy_count` enemy spawns
pub fn generate_level(level: u32, enemy_count: usize, arena: &Arena) -> LevelLayout {
    let mut rng = Pcg32::seed_from_u64(level_seed(level));
    let obstacles = build_obstacles(level, arena, &mut rng);
    let enemy_spawns = place_enemies(enemy_count, &obstacles, arena, &mut rng);

    if enemy_spawns.len() < enemy_count {
        log::debug!(
            "Level {}: placed {} of {} enemies",
            level,
            enemy_spawns.len(),
            enemy_count
        );
    }
    log::debug!(
        "Level {}: {} obstacles ({} steel)",
        level,
        obstacles.len(),
        obstacles
            .iter()
            .filter(|o| o.kind == ObstacleKind::Steel)
            .count()
    );

    LevelLayout {
        obstacles,
        enemy_spawns,
    }
}

fn build_obstacles(level: u32, arena: &Arena, rng: &mut Pcg32) -> Vec<Obstacle> {
    let cols = (arena.width / TILE) as i32;
    let rows = (arena.height / TILE) as i32;
    let safe_zone = arena.player_safe_zone();
    let enemy_band = arena.enemy_safe_band();
    let mut obstacles: Vec<Obstacle> = Vec::new();

    let mut add = |kind: ObstacleKind, gx: i32, gy: i32| {
        let rect = Rect::new(gx as f32 * TILE, gy as f32 * TILE, TILE, TILE);
        if rect.intersects(&safe_zone) || rect.intersects(&enemy_band) {
            return;
        }
        if rect.left() < EDGE_MARGIN || rect.right() > arena.width - EDGE_MARGIN {
            return;
        }
        if rect.top() < EDGE_MARGIN || rect.bottom() > arena.height - EDGE_MARGIN {
            return;
        }
        if obstacles.iter().any(|o| o.rect.intersects(&rect)) {
            return;
        }
        obstacles.push(Obstacle::new(rect, kind));
    };

    // Steel spine down the middle with a two-row gap
    let center_col = cols / 2;
    let gap = [rows / 2 - 1, rows / 2];
    for gy in FIRST_OBSTACLE_ROW..rows - 2 {
        if !gap.contains(&gy) {
            add(ObstacleKind::Steel, center_col, gy);
        }
    }

    let steel_chance = 0.16 + level as f64 * 0.03;
    for _ in 0..14 + level * 3 {
        let gx = rng.random_range(1..=cols - 2);
        let gy = rng.random_range(FIRST_OBSTACLE_ROW..=rows - 2);
        let kind = if rng.random::<f64>() < steel_chance {
            ObstacleKind::Steel
        } else {
            ObstacleKind::Brick
        };
        add(kind, gx, gy);
    }

    obstacles
}

fn place_enemies(
    count: usize,
    obstacles: &[Obstacle],
    arena: &Arena,
    rng: &mut Pcg32,
) -> Vec<Vec2> {
    let player_spawn = arena.player_spawn_rect();
    let max_x = (arena.width - 48.0) as i32;
    let max_y = (arena.height / 2.0) as i32;
    let mut spawns: Vec<Vec2> = Vec::with_capacity(count);
    let mut attempts = 0;

    while spawns.len() < count && attempts < ENEMY_SPAWN_ATTEMPTS {
        attempts += 1;
        let pos = Vec2::new(
            rng.random_range(48..=max_x) as f32,
            rng.random_range(42..=max_y) as f32,
        );
        let rect = Rect::from_center(pos, Tank::half_extent() * 2.0);
        if rect.intersects(&player_spawn) {
            continue;
        }
        if obstacles.iter().any(|o| o.rect.intersects(&rect)) {
            continue;
        }
        let crowded = spawns
            .iter()
            .any(|&other| Rect::from_center(other, Tank::half_extent() * 2.0).intersects(&rect));
        if crowded {
            continue;
        }
        spawns.push(pos);
    }

    spawns
}

/// Enemy parameters for one level of a difficulty
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelTuning {
    pub enemy_count: usize,
    pub enemy_speed: f32,
    pub enemy_fire_cooldown: Duration,
    pub enemy_fire_chance: f32,
}

impl LevelTuning {
    pub fn new(bundle: &DifficultyBundle, level: u32) -> Self {
        let step = level.saturating_sub(1);
        let cd_scale = 1.0 + 0.12 * step as f64;
        let cd_ms = ((bundle.enemy_fire_cd_ms as f64 / cd_scale) as u64).max(MIN_ENEMY_FIRE_CD_MS);
        Self {
            enemy_count: bundle.base_enemy_count + step as usize,
            enemy_speed: bundle.enemy_speed * (1.0 + 0.08 * step as f32),
            enemy_fire_cooldown: Duration::from_millis(cd_ms),
            enemy_fire_chance: bundle.enemy_fire_chance * (1.0 + 0.15 * step as f32),
        }
    }
}
