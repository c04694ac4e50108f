//! Collision passes between bullets, obstacles and tanks
//!
//! Each pass marks what it consumes and compacts the lists once at the end,
//! so an entity consumed earlier in a pass can't be matched again in the same
//! pass ("first match wins").

use super::entities::{Bullet, Obstacle, Owner, Tank};
use super::rect::Rect;

/// Keep only the items whose flag is false
fn compact<T>(items: &mut Vec<T>, removed: &[bool]) {
    let mut flags = removed.iter();
    items.retain(|_| !flags.next().copied().unwrap_or(false));
}

/// Outcome of the bullet-vs-obstacle pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObstacleHits {
    pub bullets_consumed: usize,
    pub obstacles_destroyed: usize,
}

/// Each bullet is consumed by the first obstacle it overlaps; obstacles
/// destroyed by the hit are removed.
pub fn bullets_vs_obstacles(bullets: &mut Vec<Bullet>, obstacles: &mut Vec<Obstacle>) -> ObstacleHits {
    let mut bullet_gone = vec![false; bullets.len()];
    let mut obstacle_gone = vec![false; obstacles.len()];
    let mut hits = ObstacleHits::default();

    for (i, bullet) in bullets.iter().enumerate() {
        let rect = bullet.rect();
        let target = obstacles
            .iter()
            .enumerate()
            .find(|(j, o)| !obstacle_gone[*j] && o.rect.intersects(&rect))
            .map(|(j, _)| j);

        if let Some(j) = target {
            bullet_gone[i] = true;
            hits.bullets_consumed += 1;
            if obstacles[j].hit() {
                obstacle_gone[j] = true;
                hits.obstacles_destroyed += 1;
            }
        }
    }

    compact(bullets, &bullet_gone);
    compact(obstacles, &obstacle_gone);
    hits
}

/// Opposite-owner bullets that overlap cancel each other. Each bullet pairs
/// with at most one other: the first later bullet it overlaps.
pub fn bullets_vs_bullets(bullets: &mut Vec<Bullet>) -> usize {
    let mut gone = vec![false; bullets.len()];
    let mut pairs = 0;

    for i in 0..bullets.len() {
        if gone[i] {
            continue;
        }
        let rect = bullets[i].rect();
        for j in i + 1..bullets.len() {
            if gone[j] {
                continue;
            }
            if bullets[i].owner != bullets[j].owner && rect.intersects(&bullets[j].rect()) {
                gone[i] = true;
                gone[j] = true;
                pairs += 1;
                break;
            }
        }
    }

    compact(bullets, &gone);
    pairs
}

/// Index of the first enemy bullet overlapping the player, if any
pub fn first_enemy_bullet_hitting(bullets: &[Bullet], player: &Rect) -> Option<usize> {
    bullets
        .iter()
        .position(|b| b.owner == Owner::Enemy && b.rect().intersects(player))
}

/// Each player bullet destroys the first enemy it overlaps; both are removed.
/// Returns the number of enemies destroyed.
pub fn player_bullets_vs_enemies(bullets: &mut Vec<Bullet>, enemies: &mut Vec<Tank>) -> u32 {
    let mut bullet_gone = vec![false; bullets.len()];
    let mut enemy_gone = vec![false; enemies.len()];
    let mut kills = 0;

    for (i, bullet) in bullets.iter().enumerate() {
        if bullet.owner != Owner::Player {
            continue;
        }
        let rect = bullet.rect();
        let target = enemies
            .iter()
            .enumerate()
            .find(|(j, e)| !enemy_gone[*j] && e.rect().intersects(&rect))
            .map(|(j, _)| j);

        if let Some(j) = target {
            bullet_gone[i] = true;
            enemy_gone[j] = true;
            kills += 1;
        }
    }

    compact(bullets, &bullet_gone);
    compact(enemies, &enemy_gone);
    kills
}

/// Whether any obstacle overlaps a rect
pub fn hits_any_obstacle(rect: &Rect, obstacles: &[Obstacle]) -> bool {
    obstacles.iter().any(|o| o.rect.intersects(rect))
}
