use std::io::{self, Write};

use log::debug;

use crate::engine::progress::Advance;
use crate::session::game::{KeyOutcome, LevelOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundEffect {
    Keypress,
    Error,
    LevelSuccess,
    LevelFailed,
    CurriculumComplete,
}

impl SoundEffect {
    pub fn for_outcome(outcome: KeyOutcome) -> Option<Self> {
        match outcome {
            KeyOutcome::Ignored => None,
            KeyOutcome::Correct => Some(SoundEffect::Keypress),
            KeyOutcome::Incorrect => Some(SoundEffect::Error),
            KeyOutcome::Finished(LevelOutcome::Failed) => Some(SoundEffect::LevelFailed),
            KeyOutcome::Finished(LevelOutcome::Passed(Advance::CurriculumComplete)) => {
                Some(SoundEffect::CurriculumComplete)
            }
            KeyOutcome::Finished(LevelOutcome::Passed(_)) => Some(SoundEffect::LevelSuccess),
        }
    }
}

pub trait SoundPlayer {
    fn play(&mut self, effect: SoundEffect);
}

pub struct Silent;

impl SoundPlayer for Silent {
    fn play(&mut self, _effect: SoundEffect) {}
}

/// Rings the terminal bell: once for mistakes and failures, twice for a
/// passed level. Keypresses stay quiet.
pub struct TerminalBell<W: Write> {
    out: W,
}

impl TerminalBell<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn rings(effect: SoundEffect) -> usize {
        match effect {
            SoundEffect::Keypress => 0,
            SoundEffect::Error | SoundEffect::LevelFailed => 1,
            SoundEffect::LevelSuccess | SoundEffect::CurriculumComplete => 2,
        }
    }
}

impl<W: Write> SoundPlayer for TerminalBell<W> {
    fn play(&mut self, effect: SoundEffect) {
        let rings = Self::rings(effect);
        if rings == 0 {
            return;
        }
        let bells = "\x07".repeat(rings);
        if let Err(e) = self
            .out
            .write_all(bells.as_bytes())
            .and_then(|_| self.out.flush())
        {
            debug!("terminal bell failed: {e}");
        }
    }
}
