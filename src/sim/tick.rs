//! Fixed timestep simulation tick
//!
//! Core round loop that advances the simulation deterministically.

use std::time::Duration;

use glam::Vec2;
use rand::Rng;

use super::autopilot;
use super::collision::{
    bullets_vs_bullets, bullets_vs_obstacles, first_enemy_bullet_hitting, hits_any_obstacle,
    player_bullets_vs_enemies,
};
use super::entities::{Owner, random_cardinal};
use super::state::{GameEvent, GamePhase, RoundState};
use crate::{DOWN, LEFT, RIGHT, UP};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub move_up: bool,
    pub move_down: bool,
    pub move_left: bool,
    pub move_right: bool,
    /// Fire pressed this frame
    pub fire: bool,
    /// Demo mode - the autopilot plays for the player
    pub autopilot: bool,
}

impl TickInput {
    /// Combined movement direction (not normalized; may be diagonal or zero)
    pub fn move_vector(&self) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.move_up {
            v += UP;
        }
        if self.move_down {
            v += DOWN;
        }
        if self.move_left {
            v += LEFT;
        }
        if self.move_right {
            v += RIGHT;
        }
        v
    }
}

/// What a hit on the player led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Player was invincible
    Ignored,
    /// Lost a life and respawned
    Respawned,
    /// Lost the last life
    Defeated,
}

/// Advance the round by one frame of `dt`
pub fn tick(state: &mut RoundState, input: &TickInput, dt: Duration) {
    state.clock += dt;

    match state.phase {
        GamePhase::Playing => update_playing(state, input),
        GamePhase::LevelTransition => {
            if state.clock >= state.transition_until {
                let next = state.level + 1;
                state.start_level(next);
                state.phase = GamePhase::Playing;
            }
        }
        // Terminal phases only keep the clock running until reset
        GamePhase::Victory | GamePhase::Defeat => {}
        // Session-level phase; a round never enters it
        GamePhase::Menu => {}
    }
}

fn update_playing(state: &mut RoundState, input: &TickInput) {
    let input = if input.autopilot {
        autopilot::drive(state)
    } else {
        input.clone()
    };
    let arena = state.config.arena;
    let now = state.clock;

    // Player movement: reject moves that end inside an obstacle
    let before = state.player.pos;
    state.player.move_by(input.move_vector(), &arena);
    if hits_any_obstacle(&state.player.rect(), &state.obstacles) {
        state.player.pos = before;
    }

    // Player fire
    let bundle = state.bundle();
    let bullet_cap = bundle.max_player_bullets;
    let player_cd = Duration::from_millis(bundle.player_fire_cd_ms);
    if input.fire && state.player_bullet_count() < bullet_cap && state.player.can_fire(player_cd, now) {
        let bullet = state.player.fire(Owner::Player, now);
        state.bullets.push(bullet);
        state.stats.shots += 1;
        state.events.push(GameEvent::PlayerFired);
    }

    // Enemies
    let tuning = state.tuning();
    let target = state.player.pos;
    for enemy in state.enemies.iter_mut() {
        let before = enemy.pos;
        enemy.think(target, now, &arena, &mut state.ai_rng);
        if hits_any_obstacle(&enemy.rect(), &state.obstacles) {
            enemy.pos = before;
            enemy.facing = random_cardinal(&mut state.ai_rng);
        }

        if enemy.can_fire(tuning.enemy_fire_cooldown, now)
            && state.ai_rng.random::<f32>() < tuning.enemy_fire_chance
        {
            enemy.face_toward(target);
            state.bullets.push(enemy.fire(Owner::Enemy, now));
            state.events.push(GameEvent::EnemyFired);
        }
    }

    // Bullets
    let speed = state.config.bullet_speed;
    for bullet in state.bullets.iter_mut() {
        bullet.update(speed);
    }
    state.bullets.retain(|b| !b.offscreen(&arena));

    if resolve_hits(state) {
        return;
    }

    if state.enemies.is_empty() {
        let level = state.level;
        state.events.push(GameEvent::LevelCleared { level });
        if level >= state.config.total_levels {
            state.finish(true);
        } else {
            log::info!("Level {} cleared", level);
            state.phase = GamePhase::LevelTransition;
            state.transition_until = now + Duration::from_millis(state.config.level_transition_ms);
        }
    }
}

/// Run the collision passes in order. Returns true if the round ended.
fn resolve_hits(state: &mut RoundState) -> bool {
    let hits = bullets_vs_obstacles(&mut state.bullets, &mut state.obstacles);
    for _ in 0..hits.obstacles_destroyed {
        state.events.push(GameEvent::ObstacleDestroyed);
    }

    bullets_vs_bullets(&mut state.bullets);

    // Enemy bullets vs player
    while let Some(i) = first_enemy_bullet_hitting(&state.bullets, &state.player.rect()) {
        state.bullets.remove(i);
        if hit_player(state) == HitOutcome::Defeated {
            return true;
        }
    }

    // Player bullets vs enemies
    let kills = player_bullets_vs_enemies(&mut state.bullets, &mut state.enemies);
    state.stats.kills += kills;
    for _ in 0..kills {
        state.events.push(GameEvent::EnemyDestroyed {
            remaining: state.enemies.len(),
        });
    }

    // Enemy bodies vs player
    for i in 0..state.enemies.len() {
        if state.enemies[i].rect().intersects(&state.player.rect())
            && hit_player(state) == HitOutcome::Defeated
        {
            return true;
        }
    }

    false
}

/// Apply a hit to the player, honoring the invincibility window
pub fn hit_player(state: &mut RoundState) -> HitOutcome {
    if state.is_invincible() {
        return HitOutcome::Ignored;
    }

    state.lives = state.lives.saturating_sub(1);
    state.stats.deaths += 1;
    state.events.push(GameEvent::PlayerHit {
        lives_left: state.lives,
    });

    if state.lives == 0 {
        state.finish(false);
        return HitOutcome::Defeated;
    }

    log::debug!("Player hit, {} lives left", state.lives);
    state.player.pos = state.config.arena.player_spawn();
    state.player.facing = UP;
    state.bullets.retain(|b| b.owner == Owner::Player);
    state.invincible_until = state.clock + state.respawn_invincibility();
    HitOutcome::Respawned
}
