//! Demo-mode driver for the player tank
//!
//! Reads the round state and produces the input a simple player would give:
//! sidestep incoming fire, line up with the nearest enemy on one axis, then
//! turn to face it and shoot. Uses no randomness, so autopiloted rounds stay
//! as deterministic as the seed that drives the enemies.

use glam::Vec2;

use super::collision::hits_any_obstacle;
use super::entities::Owner;
use super::state::RoundState;
use super::tick::TickInput;

/// Offset on the cross axis that still counts as lined up
const ALIGN_TOLERANCE: f32 = 8.0;
/// Enemy bullets closer than this are worth dodging
const DODGE_RANGE: f32 = 96.0;
/// Lateral distance inside which an incoming bullet will connect
const DODGE_WIDTH: f32 = 24.0;

/// Compute this frame's input for the player tank
pub fn drive(state: &RoundState) -> TickInput {
    let player = &state.player;

    if let Some(dodge) = incoming_bullet_dodge(state) {
        return input_for(dodge, false);
    }

    let Some(target) = state
        .enemies
        .iter()
        .map(|e| e.pos)
        .min_by(|a, b| a.distance_squared(player.pos).total_cmp(&b.distance_squared(player.pos)))
    else {
        return TickInput::default();
    };

    let delta = target - player.pos;

    // Lined up: face the enemy and shoot
    if delta.x.abs() <= ALIGN_TOLERANCE {
        return input_for(Vec2::new(0.0, delta.y.signum()), true);
    }
    if delta.y.abs() <= ALIGN_TOLERANCE {
        return input_for(Vec2::new(delta.x.signum(), 0.0), true);
    }

    // Close the gap on the horizontal axis first, vertical if blocked
    let horizontal = Vec2::new(delta.x.signum(), 0.0);
    if !blocked(state, horizontal) {
        return input_for(horizontal, false);
    }
    let vertical = Vec2::new(0.0, delta.y.signum());
    if !blocked(state, vertical) {
        return input_for(vertical, false);
    }

    // Boxed in: shoot through whatever is in the way
    input_for(horizontal, true)
}

/// Perpendicular step away from the nearest enemy bullet on a collision course
fn incoming_bullet_dodge(state: &RoundState) -> Option<Vec2> {
    let pos = state.player.pos;
    state
        .bullets
        .iter()
        .filter(|b| b.owner == Owner::Enemy)
        .filter_map(|b| {
            let to_player = pos - b.pos;
            let along = to_player.dot(b.dir);
            if along <= 0.0 || to_player.length() > DODGE_RANGE {
                return None;
            }
            let lateral = to_player - b.dir * along;
            if lateral.length() > DODGE_WIDTH {
                return None;
            }
            Some((along, b.dir.perp(), lateral))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, perp, lateral)| {
            // Step to whichever side the player is already leaning
            let side = if lateral.dot(perp) >= 0.0 { perp } else { -perp };
            if blocked(state, side) { -side } else { side }
        })
}

fn blocked(state: &RoundState, dir: Vec2) -> bool {
    let mut probe = state.player.clone();
    probe.move_by(dir, &state.config.arena);
    probe.pos == state.player.pos || hits_any_obstacle(&probe.rect(), &state.obstacles)
}

fn input_for(dir: Vec2, fire: bool) -> TickInput {
    TickInput {
        move_up: dir.y < 0.0,
        move_down: dir.y > 0.0,
        move_left: dir.x < 0.0,
        move_right: dir.x > 0.0,
        fire,
        autopilot: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, GameConfig};
    use crate::sim::entities::{Bullet, Obstacle, ObstacleKind, Tank};
    use crate::sim::rect::Rect;
    use crate::{DOWN, UP};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::time::Duration;

    fn open_round() -> RoundState {
        let mut state = RoundState::new(GameConfig::default(), Difficulty::Medium, 3).unwrap();
        state.obstacles.clear();
        state.enemies.clear();
        state
    }

    fn add_enemy(state: &mut RoundState, pos: Vec2) {
        let mut rng = Pcg32::seed_from_u64(0);
        state.enemies.push(Tank::enemy(pos, 1.0, Duration::ZERO, &mut rng));
    }

    #[test]
    fn test_idle_without_enemies() {
        let state = open_round();
        assert_eq!(drive(&state), TickInput::default());
    }

    #[test]
    fn test_fires_when_aligned() {
        let mut state = open_round();
        let pos = state.player.pos;
        add_enemy(&mut state, Vec2::new(pos.x + 3.0, 100.0));
        let input = drive(&state);
        assert!(input.fire);
        assert!(input.move_up);
        assert!(!input.move_left && !input.move_right);
    }

    #[test]
    fn test_closes_horizontal_gap_toward_nearest() {
        let mut state = open_round();
        let pos = state.player.pos;
        add_enemy(&mut state, Vec2::new(pos.x + 200.0, 100.0));
        add_enemy(&mut state, Vec2::new(pos.x - 100.0, 300.0));
        let input = drive(&state);
        assert!(input.move_left);
        assert!(!input.fire);
    }

    #[test]
    fn test_switches_axis_when_blocked() {
        let mut state = open_round();
        state.player.pos = Vec2::new(300.0, 300.0);
        add_enemy(&mut state, Vec2::new(500.0, 100.0));
        state
            .obstacles
            .push(Obstacle::new(Rect::new(320.0, 280.0, 32.0, 32.0), ObstacleKind::Steel));
        let input = drive(&state);
        assert!(input.move_up);
        assert!(!input.move_right);
    }

    #[test]
    fn test_dodges_incoming_bullet() {
        let mut state = open_round();
        state.player.pos = Vec2::new(300.0, 300.0);
        add_enemy(&mut state, Vec2::new(300.0, 100.0));
        // Coming straight down at the player, slightly left of center
        state
            .bullets
            .push(Bullet::new(Vec2::new(296.0, 240.0), DOWN, Owner::Enemy));
        let input = drive(&state);
        assert!(input.move_left || input.move_right);
        assert!(!input.fire);

        // Bullets flying away are ignored
        state.bullets = vec![Bullet::new(Vec2::new(300.0, 240.0), UP, Owner::Enemy)];
        assert!(drive(&state).fire);
    }
}
