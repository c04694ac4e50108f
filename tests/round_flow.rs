//! Session and store flow across whole rounds

use std::time::Duration;

use tank_battle::sim::{Bullet, GamePhase, Owner};
use tank_battle::{
    Difficulty, FrameInput, Game, GameConfig, JsonLinesStore, MemoryStore, ResultStore, UP,
};

const FRAME: Duration = Duration::from_millis(16);

fn lose_current_round<S: ResultStore>(game: &mut Game<S>) {
    let round = game.round_mut().expect("round in progress");
    round.lives = 1;
    round.invincible_until = Duration::ZERO;
    let pos = round.player.pos;
    round.bullets.push(Bullet::new(pos, UP, Owner::Enemy));
    game.frame(&FrameInput::default(), FRAME);
    assert_eq!(game.phase(), GamePhase::Defeat);
}

#[test]
fn test_results_land_on_the_right_leaderboard() {
    let mut game = Game::new(GameConfig::default(), MemoryStore::new(), 9).unwrap();
    game.set_player_name("rookie");

    game.frame(
        &FrameInput {
            select_difficulty: Some(Difficulty::Easy),
            ..Default::default()
        },
        FRAME,
    );
    game.frame(
        &FrameInput {
            confirm: true,
            ..Default::default()
        },
        FRAME,
    );
    assert_eq!(game.phase(), GamePhase::Playing);
    lose_current_round(&mut game);

    game.frame(
        &FrameInput {
            reset: true,
            ..Default::default()
        },
        FRAME,
    );
    game.start_round_by_key("hard").unwrap();
    lose_current_round(&mut game);

    let store = game.store();
    let easy = store.top_results(10, Some(Difficulty::Easy)).unwrap();
    let hard = store.top_results(10, Some(Difficulty::Hard)).unwrap();
    assert_eq!(easy.len(), 1);
    assert_eq!(hard.len(), 1);
    assert_eq!(hard[0].player_name, "rookie");
    assert_eq!(hard[0].level_reached, 1);
    assert_eq!(hard[0].deaths, 1);
    assert!(!hard[0].victory);
    assert_eq!(store.top_results(10, None).unwrap().len(), 2);

    // The menu board follows the last round's difficulty
    assert_eq!(game.leaderboard().difficulty, Difficulty::Hard);
    assert_eq!(game.leaderboard().entries.len(), 1);
}

#[test]
fn test_autopilot_round_progresses() {
    let mut game = Game::new(GameConfig::default(), MemoryStore::new(), 2024).unwrap();
    game.start_round(Difficulty::Easy).unwrap();
    let input = FrameInput {
        autopilot: true,
        ..Default::default()
    };
    for _ in 0..60 * 20 {
        game.frame(&input, FRAME);
        if game.phase().is_terminal() {
            break;
        }
    }
    let round = game.round().expect("round");
    // The autopilot shoots; whatever happened, the books balance
    assert!(round.stats.shots > 0);
    assert!(round.stats.kills <= round.stats.shots);
    assert!(round.lives + round.stats.deaths == game.config().player_lives);
    if round.phase.is_terminal() {
        assert!(round.result_saved);
        assert_eq!(game.store().len(), 1);
    }
}

#[test]
fn test_json_lines_store_backs_a_session() {
    let dir = std::env::temp_dir().join(format!("tank-battle-flow-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join("results.jsonl");

    {
        let store = JsonLinesStore::open(&path).unwrap();
        let mut game = Game::new(GameConfig::default(), store, 1).unwrap();
        game.start_round(Difficulty::Medium).unwrap();
        lose_current_round(&mut game);
    }

    let store = JsonLinesStore::open(&path).unwrap();
    let results = store.top_results(10, Some(Difficulty::Medium)).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].player_name, "player");
    assert!(store.best_rating(None).unwrap() > 0.0);
}
