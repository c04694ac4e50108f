//! Tank Battle headless runner
//!
//! Plays rounds with the autopilot at the fixed frame rate (as fast as the
//! machine allows), stores the results and prints the leaderboard.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use tank_battle::sim::GamePhase;
use tank_battle::{Difficulty, FrameInput, Game, GameConfig, JsonLinesStore, ResultStore};

/// Command-line arguments for the headless runner.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Difficulty to play: easy, medium or hard.
    #[arg(short, long, default_value = "medium")]
    difficulty: String,
    /// Name results are stored under.
    #[arg(short, long)]
    name: Option<String>,
    /// AI seed of the first round; later rounds count up from it.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of rounds to play.
    #[arg(
        short,
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    rounds: u32,
    /// Give up on a round after this many frames.
    #[arg(long, value_name = "FRAMES", default_value_t = 60 * 60 * 15)]
    max_frames: u64,
    /// Result store (JSON lines).
    #[arg(long, value_name = "PATH", default_value = "tank_battle_results.jsonl")]
    store: PathBuf,
    /// Game configuration overrides (JSON).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Only print the leaderboard.
    #[arg(long)]
    leaderboard_only: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    let difficulty = Difficulty::from_key(&args.difficulty)?;
    let store = JsonLinesStore::open(&args.store)
        .with_context(|| format!("opening result store {}", args.store.display()))?;
    let seed = args.seed.unwrap_or_else(rand::random);

    log::info!("Tank Battle (headless) starting, first seed {}", seed);

    let mut game = Game::new(config, store, seed)?;
    if let Some(name) = &args.name {
        game.set_player_name(name);
    }
    game.select_difficulty(difficulty);

    if !args.leaderboard_only {
        for round in 1..=args.rounds {
            play_round(&mut game, difficulty, args.max_frames)?;
            print_round(&game, round);
            game.return_to_menu();
        }
    }

    print_leaderboard(&game);
    Ok(())
}

/// Run one autopilot round to its end (or the frame limit)
fn play_round<S: ResultStore>(
    game: &mut Game<S>,
    difficulty: Difficulty,
    max_frames: u64,
) -> Result<()> {
    game.start_round(difficulty)?;
    let dt = game.config().frame_duration();
    let input = FrameInput {
        autopilot: true,
        ..Default::default()
    };

    for _ in 0..max_frames {
        game.frame(&input, dt);
        let saved = game.round().is_some_and(|r| r.result_saved);
        if game.phase().is_terminal() && saved {
            return Ok(());
        }
    }
    log::warn!("Round stopped after {} frames", max_frames);
    Ok(())
}

fn print_round<S: ResultStore>(game: &Game<S>, number: u32) {
    let Some(round) = game.round() else {
        return;
    };
    match (&round.summary, round.phase) {
        (Some(summary), _) => println!(
            "Round {}: {} on {} - level {}, kills {}, deaths {}, shots {}, {:.1}s, rating {:.2}/{:.1}",
            number,
            if summary.victory { "victory" } else { "defeat" },
            summary.difficulty.label(),
            summary.level_reached,
            summary.stats.kills,
            summary.stats.deaths,
            summary.stats.shots,
            summary.elapsed_sec,
            summary.rating,
            game.config().rating_cap(summary.difficulty),
        ),
        (None, GamePhase::Playing | GamePhase::LevelTransition) => println!(
            "Round {}: unfinished at level {} (kills {}, lives {})",
            number, round.level, round.stats.kills, round.lives
        ),
        (None, _) => {}
    }
    if game.made_leaderboard() == Some(true) {
        println!("  {} made the {} leaderboard", game.player_name(), round.difficulty.label());
    }
}

fn print_leaderboard<S: ResultStore>(game: &Game<S>) {
    let board = game.leaderboard();
    println!();
    println!("{}", board.title());
    println!("{}", board.best_line());
    for line in board.lines() {
        println!("{}", line);
    }
}
