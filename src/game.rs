//! Play session: menu, rounds and result storage
//!
//! `Game` owns the result store and at most one round. Each frame it either
//! handles menu input or ticks the round, and stores a finished round's
//! result exactly once. Store failures are logged and retried, never fatal.

use std::time::Duration;

use crate::config::{Difficulty, GameConfig};
use crate::consts::MAX_PLAYER_NAME_LEN;
use crate::error::ConfigError;
use crate::leaderboard::Leaderboard;
use crate::persistence::{NewResult, ResultStore};
use crate::sim::{GameEvent, GamePhase, RoundState, RoundSummary, TickInput, tick};

/// Minimum gap between attempts to store the same round
const SAVE_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Input for one frame. Movement is held; the rest are edge-triggered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub move_up: bool,
    pub move_down: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub fire: bool,
    /// Start a round from the menu
    pub confirm: bool,
    /// Abandon whatever is going on and return to the menu
    pub reset: bool,
    /// Menu difficulty hotkey
    pub select_difficulty: Option<Difficulty>,
    /// Let the autopilot play
    pub autopilot: bool,
}

impl FrameInput {
    pub fn tick_input(&self) -> TickInput {
        TickInput {
            move_up: self.move_up,
            move_down: self.move_down,
            move_left: self.move_left,
            move_right: self.move_right,
            fire: self.fire,
            autopilot: self.autopilot,
        }
    }
}

pub struct Game<S: ResultStore> {
    config: GameConfig,
    store: S,
    player_name: String,
    selected: Difficulty,
    leaderboard: Leaderboard,
    round: Option<RoundState>,
    /// AI seed for the next round
    next_seed: u64,
    /// Round clock at the last failed store attempt
    last_save_attempt: Option<Duration>,
    /// Whether the stored result made the board
    placed: Option<bool>,
}

impl<S: ResultStore> Game<S> {
    /// New session in the menu. Rounds are seeded `seed`, `seed + 1`, ...
    pub fn new(config: GameConfig, store: S, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let selected = Difficulty::default();
        let mut game = Self {
            player_name: config.default_player_name.clone(),
            leaderboard: Leaderboard::new(selected, config.rating_cap(selected)),
            config,
            store,
            selected,
            round: None,
            next_seed: seed,
            last_save_attempt: None,
            placed: None,
        };
        game.refresh_leaderboard();
        Ok(game)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Set the name results are stored under. Whitespace is trimmed and an
    /// empty name falls back to the configured default.
    pub fn set_player_name(&mut self, name: &str) {
        let trimmed: String = name.trim().chars().take(MAX_PLAYER_NAME_LEN).collect();
        self.player_name = if trimmed.is_empty() {
            self.config.default_player_name.clone()
        } else {
            trimmed
        };
    }

    pub fn selected_difficulty(&self) -> Difficulty {
        self.selected
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    pub fn round_mut(&mut self) -> Option<&mut RoundState> {
        self.round.as_mut()
    }

    pub fn phase(&self) -> GamePhase {
        self.round.as_ref().map_or(GamePhase::Menu, |r| r.phase)
    }

    /// Whether the current round's stored result ranks on its leaderboard.
    /// `None` until the result is stored.
    pub fn made_leaderboard(&self) -> Option<bool> {
        self.placed
    }

    /// Final numbers of the current round, once it has ended
    pub fn summary(&self) -> Option<&RoundSummary> {
        self.round.as_ref().and_then(|r| r.summary.as_ref())
    }

    /// Advance the session by one frame
    pub fn frame(&mut self, input: &FrameInput, dt: Duration) {
        if input.reset {
            self.return_to_menu();
            return;
        }

        if self.round.is_none() {
            self.update_menu(input);
            return;
        }
        let Some(round) = self.round.as_mut() else {
            return;
        };

        tick(round, &input.tick_input(), dt);
        for event in round.drain_events() {
            log_event(&event);
        }
        if round.phase.is_terminal() {
            self.store_result();
        }
    }

    fn update_menu(&mut self, input: &FrameInput) {
        if let Some(difficulty) = input.select_difficulty {
            self.select_difficulty(difficulty);
        } else if input.confirm {
            if let Err(e) = self.start_round(self.selected) {
                log::warn!("Cannot start round: {}", e);
            }
        }
    }

    /// Change the menu selection and show its leaderboard
    pub fn select_difficulty(&mut self, difficulty: Difficulty) {
        self.selected = difficulty;
        self.refresh_leaderboard();
    }

    pub fn start_round(&mut self, difficulty: Difficulty) -> Result<(), ConfigError> {
        let round = RoundState::new(self.config.clone(), difficulty, self.next_seed)?;
        self.selected = difficulty;
        let seed = self.next_seed;
        self.next_seed = self.next_seed.wrapping_add(1);
        log::info!(
            "{} starting a {} round (seed {})",
            self.player_name,
            difficulty,
            seed
        );
        self.round = Some(round);
        self.last_save_attempt = None;
        self.placed = None;
        self.refresh_leaderboard();
        Ok(())
    }

    /// Start a round by difficulty key, rejecting unknown keys
    pub fn start_round_by_key(&mut self, key: &str) -> Result<(), ConfigError> {
        let difficulty = Difficulty::from_key(key)?;
        self.start_round(difficulty)
    }

    /// Drop the current round (if any) and show the menu
    pub fn return_to_menu(&mut self) {
        if let Some(round) = self.round.take() {
            if !round.result_saved && round.summary.is_some() {
                log::warn!("Leaving round without a stored result");
            }
        }
        self.last_save_attempt = None;
        self.placed = None;
        self.refresh_leaderboard();
    }

    /// Store the finished round, at most one attempt per retry interval
    fn store_result(&mut self) {
        let Some(round) = self.round.as_mut() else {
            return;
        };
        if round.result_saved {
            return;
        }
        let Some(summary) = round.summary else {
            return;
        };
        if let Some(last) = self.last_save_attempt {
            if round.clock.saturating_sub(last) < SAVE_RETRY_INTERVAL {
                return;
            }
        }

        let placed = self.leaderboard.difficulty == summary.difficulty
            && self
                .leaderboard
                .qualifies(summary.rating, self.config.leaderboard_limit);
        let result = NewResult::from_summary(&self.player_name, &summary);
        match self.store.add_result(result) {
            Ok(()) => {
                round.result_saved = true;
                self.last_save_attempt = None;
                self.placed = Some(placed);
                log::info!(
                    "Stored {} result for {}: {:.2}",
                    summary.difficulty,
                    self.player_name,
                    summary.rating
                );
                if placed {
                    log::info!("{} made the {} leaderboard", self.player_name, summary.difficulty);
                }
            }
            Err(e) => {
                self.last_save_attempt = Some(round.clock);
                log::warn!("Failed to store round result: {}", e);
                return;
            }
        }
        self.refresh_leaderboard();
    }

    fn refresh_leaderboard(&mut self) {
        match Leaderboard::load(&self.store, &self.config, self.selected) {
            Ok(board) => self.leaderboard = board,
            Err(e) => log::warn!("Failed to load leaderboard: {}", e),
        }
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::PlayerFired | GameEvent::EnemyFired => log::trace!("{:?}", event),
        _ => log::debug!("{:?}", event),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::persistence::test_support::result;
    use crate::persistence::{MemoryStore, RoundResult};
    use crate::sim::{Arena, Bullet, Owner};
    use crate::UP;

    const FRAME: Duration = Duration::from_millis(16);

    /// Store that fails its first `failures` writes
    struct FlakyStore {
        inner: MemoryStore,
        failures: u32,
        attempts: u32,
    }

    impl FlakyStore {
        fn new(failures: u32) -> Self {
            Self {
                inner: MemoryStore::new(),
                failures,
                attempts: 0,
            }
        }
    }

    impl ResultStore for FlakyStore {
        fn add_result(&mut self, result: NewResult) -> Result<(), StoreError> {
            self.attempts += 1;
            if self.failures > 0 {
                self.failures -= 1;
                return Err(StoreError::Unavailable("disk full".to_string()));
            }
            self.inner.add_result(result)
        }

        fn top_results(
            &self,
            limit: usize,
            difficulty: Option<Difficulty>,
        ) -> Result<Vec<RoundResult>, StoreError> {
            self.inner.top_results(limit, difficulty)
        }

        fn best_rating(&self, difficulty: Option<Difficulty>) -> Result<f64, StoreError> {
            self.inner.best_rating(difficulty)
        }
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    /// Put an enemy bullet on a one-life, unprotected player
    fn set_up_defeat<S: ResultStore>(game: &mut Game<S>) {
        let round = game.round_mut().expect("round in progress");
        round.lives = 1;
        round.invincible_until = Duration::ZERO;
        let pos = round.player.pos;
        round.bullets.push(Bullet::new(pos, UP, Owner::Enemy));
    }

    #[test]
    fn test_menu_select_and_confirm() {
        let mut game = Game::new(GameConfig::default(), MemoryStore::new(), 1).unwrap();
        assert_eq!(game.phase(), GamePhase::Menu);
        assert_eq!(game.selected_difficulty(), Difficulty::Medium);

        // Selection wins over confirm in the same frame
        game.frame(
            &FrameInput {
                select_difficulty: Some(Difficulty::Hard),
                confirm: true,
                ..idle()
            },
            FRAME,
        );
        assert_eq!(game.phase(), GamePhase::Menu);
        assert_eq!(game.selected_difficulty(), Difficulty::Hard);
        assert_eq!(game.leaderboard().difficulty, Difficulty::Hard);

        game.frame(&FrameInput { confirm: true, ..idle() }, FRAME);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.round().map(|r| r.difficulty), Some(Difficulty::Hard));
    }

    #[test]
    fn test_reset_returns_to_menu_from_any_phase() {
        let mut game = Game::new(GameConfig::default(), MemoryStore::new(), 1).unwrap();
        game.start_round(Difficulty::Easy).unwrap();
        game.frame(&FrameInput { reset: true, ..idle() }, FRAME);
        assert_eq!(game.phase(), GamePhase::Menu);
        assert!(game.round().is_none());

        game.start_round(Difficulty::Easy).unwrap();
        set_up_defeat(&mut game);
        game.frame(&idle(), FRAME);
        assert_eq!(game.phase(), GamePhase::Defeat);
        game.frame(&FrameInput { reset: true, ..idle() }, FRAME);
        assert_eq!(game.phase(), GamePhase::Menu);
    }

    #[test]
    fn test_unknown_difficulty_key_fails_fast() {
        let mut game = Game::new(GameConfig::default(), MemoryStore::new(), 1).unwrap();
        let err = game.start_round_by_key("nightmare").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDifficulty(_)));
        assert_eq!(game.phase(), GamePhase::Menu);

        game.start_round_by_key("HARD").unwrap();
        assert_eq!(game.round().map(|r| r.difficulty), Some(Difficulty::Hard));
    }

    #[test]
    fn test_player_name_is_trimmed() {
        let mut game = Game::new(GameConfig::default(), MemoryStore::new(), 1).unwrap();
        assert_eq!(game.player_name(), "player");
        game.set_player_name("  ace  ");
        assert_eq!(game.player_name(), "ace");
        game.set_player_name("   ");
        assert_eq!(game.player_name(), "player");
        game.set_player_name("a-name-that-is-far-too-long");
        assert_eq!(game.player_name().chars().count(), MAX_PLAYER_NAME_LEN);
    }

    #[test]
    fn test_finished_round_is_stored_once() {
        let mut game = Game::new(GameConfig::default(), MemoryStore::new(), 1).unwrap();
        game.set_player_name("ace");
        game.start_round(Difficulty::Easy).unwrap();
        set_up_defeat(&mut game);
        game.frame(&idle(), FRAME);

        assert_eq!(game.phase(), GamePhase::Defeat);
        assert!(game.round().is_some_and(|r| r.result_saved));
        assert_eq!(game.made_leaderboard(), Some(true));
        for _ in 0..120 {
            game.frame(&idle(), FRAME);
        }
        assert_eq!(game.store().len(), 1);

        let summary = *game.summary().expect("summary");
        let board = game.leaderboard();
        assert_eq!(board.difficulty, Difficulty::Easy);
        assert_eq!(board.entries.len(), 1);
        assert_eq!(board.entries[0].player_name, "ace");
        assert_eq!(board.entries[0].rating, summary.rating);
        assert!(!board.entries[0].victory);
    }

    #[test]
    fn test_store_failure_is_retried_after_interval() {
        let mut game = Game::new(GameConfig::default(), FlakyStore::new(1), 1).unwrap();
        game.start_round(Difficulty::Medium).unwrap();
        set_up_defeat(&mut game);
        game.frame(&idle(), FRAME);
        assert_eq!(game.phase(), GamePhase::Defeat);
        assert_eq!(game.store().attempts, 1);
        assert!(game.round().is_some_and(|r| !r.result_saved));

        // No retry inside the interval
        for _ in 0..10 {
            game.frame(&idle(), FRAME);
        }
        assert_eq!(game.store().attempts, 1);

        game.frame(&idle(), Duration::from_secs(1));
        assert_eq!(game.store().attempts, 2);
        assert!(game.round().is_some_and(|r| r.result_saved));
        assert_eq!(game.store().inner.len(), 1);

        game.frame(&idle(), Duration::from_secs(5));
        assert_eq!(game.store().attempts, 2);
    }

    #[test]
    fn test_rounds_get_fresh_seeds() {
        let mut game = Game::new(GameConfig::default(), MemoryStore::new(), 40).unwrap();
        game.start_round(Difficulty::Easy).unwrap();
        assert_eq!(game.round().map(|r| r.seed), Some(40));
        game.return_to_menu();
        game.start_round(Difficulty::Easy).unwrap();
        assert_eq!(game.round().map(|r| r.seed), Some(41));
    }

    #[test]
    fn test_weak_result_misses_a_full_board() {
        let config = GameConfig::default();
        let mut store = MemoryStore::new();
        let cap = config.rating_cap(Difficulty::Easy);
        for _ in 0..config.leaderboard_limit {
            store
                .add_result(result("veteran", Difficulty::Easy, true, 30, 0, 90.0, cap))
                .unwrap();
        }
        let mut game = Game::new(config, store, 1).unwrap();
        game.start_round(Difficulty::Easy).unwrap();
        assert_eq!(game.made_leaderboard(), None);
        set_up_defeat(&mut game);
        game.frame(&idle(), FRAME);

        assert!(game.round().is_some_and(|r| r.result_saved));
        assert_eq!(game.made_leaderboard(), Some(false));
        assert!(game.leaderboard().entries.iter().all(|e| e.player_name == "veteran"));

        game.return_to_menu();
        assert_eq!(game.made_leaderboard(), None);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = GameConfig::default();
        config.arena = Arena::new(80.0, 80.0);
        let err = Game::new(config, MemoryStore::new(), 1).err();
        assert!(matches!(err, Some(ConfigError::Invalid(_))));

        // A config broken after construction stops the next round, not the session
        let mut game = Game::new(GameConfig::default(), MemoryStore::new(), 1).unwrap();
        game.config.player_lives = 0;
        let err = game.start_round(Difficulty::Easy).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(game.round().is_none());
        game.frame(&FrameInput { confirm: true, ..idle() }, FRAME);
        assert_eq!(game.phase(), GamePhase::Menu);
    }
}
