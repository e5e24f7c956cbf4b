use std::time::Instant;

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use thiserror::Error;

use crate::config::Settings;
use crate::curriculum::{Curriculum, LevelDefinition, LevelKey};
use crate::engine::progress::{Advance, UserProgress};
use crate::engine::sequence::{self, GenerateError};
use crate::engine::stats::GameStats;
use crate::session::hint::HintTimer;
use crate::session::input::{CharStatus, Keystroke};
use crate::session::result::SessionResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Idle,
    Playing,
    /// Passed the final level; nothing left to unlock.
    Completed,
    LevelSuccess,
    LevelFailed,
}

impl GameStatus {
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            GameStatus::Completed | GameStatus::LevelSuccess | GameStatus::LevelFailed
        )
    }

    pub fn is_passed(self) -> bool {
        matches!(self, GameStatus::Completed | GameStatus::LevelSuccess)
    }
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("level {0} does not exist")]
    UnknownLevel(LevelKey),
    #[error("level {0} is locked")]
    LevelLocked(LevelKey),
    #[error("no level has been started")]
    NoLevel,
    #[error("practice text is empty")]
    EmptyTarget,
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

#[derive(Clone, Debug)]
pub struct GameState {
    pub status: GameStatus,
    pub level: LevelKey,
    pub input: Vec<CharStatus>,
    pub target: Vec<char>,
    pub cursor: usize,
    pub stats: GameStats,
    pub show_hint: bool,
    pub finished_at: Option<Instant>,
}

impl GameState {
    fn idle() -> Self {
        Self {
            status: GameStatus::Idle,
            level: LevelKey::FIRST,
            input: Vec::new(),
            target: Vec::new(),
            cursor: 0,
            stats: GameStats::default(),
            show_hint: false,
            finished_at: None,
        }
    }

    pub fn expected_char(&self) -> Option<char> {
        self.target.get(self.cursor).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.target.len()
    }

    pub fn progress(&self) -> f64 {
        if self.target.is_empty() {
            return 0.0;
        }
        self.cursor as f64 / self.target.len() as f64
    }
}

/// What a single keystroke did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Correct,
    Incorrect,
    Finished(LevelOutcome),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelOutcome {
    Passed(Advance),
    Failed,
}

/// One learner's practice session: the current level's target text, the
/// keystroke matcher, and the hint timer.
///
/// Progress is not owned here; callers pass it in so the same record can be
/// persisted by whoever holds it.
pub struct TypingGame {
    curriculum: Curriculum,
    settings: Settings,
    state: GameState,
    hint: HintTimer,
    last_advance: Option<Advance>,
    rng: SmallRng,
}

impl TypingGame {
    pub fn new(curriculum: Curriculum, settings: Settings) -> Self {
        Self::with_rng(curriculum, settings, SmallRng::from_entropy())
    }

    pub fn with_rng(curriculum: Curriculum, settings: Settings, rng: SmallRng) -> Self {
        let hint = HintTimer::new(settings.hint_delay());
        Self {
            curriculum,
            settings,
            state: GameState::idle(),
            hint,
            last_advance: None,
            rng,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    pub fn level(&self) -> Option<&'static LevelDefinition> {
        match self.state.status {
            GameStatus::Idle => None,
            _ => self.curriculum.level(self.state.level),
        }
    }

    pub fn last_advance(&self) -> Option<Advance> {
        self.last_advance
    }

    pub fn hint_pending(&self) -> bool {
        self.hint.is_pending()
    }

    /// New settings apply from the next level start, except that turning
    /// hints off hides and cancels them right away.
    pub fn set_settings(&mut self, settings: Settings) {
        self.hint.set_delay(settings.hint_delay());
        if !settings.hints_enabled {
            self.hint.cancel();
            self.state.show_hint = false;
        }
        self.settings = settings;
    }

    pub fn start_level(
        &mut self,
        key: LevelKey,
        progress: &UserProgress,
        now: Instant,
    ) -> Result<(), GameError> {
        let level = self
            .curriculum
            .level(key)
            .ok_or(GameError::UnknownLevel(key))?;
        if !progress.is_unlocked(key) {
            return Err(GameError::LevelLocked(key));
        }
        let text = sequence::generate_sequence(
            &level.config,
            self.settings.practice_length,
            &mut self.rng,
        )?;
        self.begin(key, &text, now)
    }

    /// Start `key` with a fixed practice text instead of a generated one.
    pub fn start_with_target(
        &mut self,
        key: LevelKey,
        target: &str,
        now: Instant,
    ) -> Result<(), GameError> {
        if self.curriculum.level(key).is_none() {
            return Err(GameError::UnknownLevel(key));
        }
        self.begin(key, target, now)
    }

    /// Same level, freshly generated text.
    pub fn restart(&mut self, progress: &UserProgress, now: Instant) -> Result<(), GameError> {
        if self.state.status == GameStatus::Idle {
            return Err(GameError::NoLevel);
        }
        self.start_level(self.state.level, progress, now)
    }

    /// Drop the current level and go back to idle.
    pub fn abandon(&mut self) {
        self.hint.cancel();
        self.state = GameState::idle();
    }

    fn begin(&mut self, key: LevelKey, target: &str, now: Instant) -> Result<(), GameError> {
        let target: Vec<char> = target.chars().collect();
        if target.is_empty() {
            return Err(GameError::EmptyTarget);
        }
        info!("starting level {key} with {} keys", target.len());
        self.state = GameState {
            status: GameStatus::Playing,
            level: key,
            input: Vec::with_capacity(target.len()),
            target,
            cursor: 0,
            stats: GameStats::default(),
            show_hint: false,
            finished_at: None,
        };
        self.last_advance = None;
        self.hint.cancel();
        if self.settings.hints_enabled {
            self.hint.schedule(now);
        }
        Ok(())
    }

    pub fn handle_key(
        &mut self,
        stroke: Keystroke,
        now: Instant,
        progress: &mut UserProgress,
    ) -> KeyOutcome {
        if self.state.status != GameStatus::Playing
            || stroke.repeat
            || stroke.key.is_modifier_only()
        {
            return KeyOutcome::Ignored;
        }
        let Some(expected) = self.state.expected_char() else {
            return KeyOutcome::Ignored;
        };

        let correct = stroke.key.matches(expected);
        self.state.stats.record(correct, now);
        self.state.input.push(if correct {
            CharStatus::Correct
        } else {
            CharStatus::Incorrect(stroke.key.typed_char())
        });
        self.state.cursor += 1;

        if self.state.is_complete() {
            return KeyOutcome::Finished(self.finish(now, progress));
        }

        if correct {
            self.state.show_hint = false;
            if self.settings.hints_enabled {
                self.hint.schedule(now);
            }
            KeyOutcome::Correct
        } else {
            KeyOutcome::Incorrect
        }
    }

    fn finish(&mut self, now: Instant, progress: &mut UserProgress) -> LevelOutcome {
        self.hint.cancel();
        self.state.show_hint = false;
        self.state.finished_at = Some(now);

        let key = self.state.level;
        let stats = self.state.stats;

        if stats.accuracy >= self.settings.min_accuracy {
            let advance = progress.record_success(&self.curriculum, key, stats.accuracy, stats.wpm);
            self.last_advance = Some(advance);
            self.state.status = match advance {
                Advance::CurriculumComplete => GameStatus::Completed,
                _ => GameStatus::LevelSuccess,
            };
            info!(
                "level {key} passed: {}% accuracy, {} wpm",
                stats.accuracy, stats.wpm
            );
            LevelOutcome::Passed(advance)
        } else {
            self.state.status = GameStatus::LevelFailed;
            info!(
                "level {key} failed: {}% accuracy (need {}%)",
                stats.accuracy, self.settings.min_accuracy
            );
            LevelOutcome::Failed
        }
    }

    /// Drive the hint timer. Returns true when the hint was just revealed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.state.status != GameStatus::Playing {
            return false;
        }
        if self.hint.poll(now) {
            self.state.show_hint = true;
            debug!("showing hint for {:?}", self.state.expected_char());
            return true;
        }
        false
    }

    pub fn next_level_key(&self) -> Option<LevelKey> {
        self.curriculum.next_level_key(self.state.level)
    }

    pub fn result(&self, now: Instant) -> Option<SessionResult> {
        self.state
            .status
            .is_finished()
            .then(|| SessionResult::from_state(&self.state, self.state.status.is_passed(), now))
    }
}
