use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::game::GameState;

/// Summary of one finished practice run, kept in the session history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub level: String,
    pub wpm: u32,
    pub accuracy: u32,
    pub correct: usize,
    pub errors: usize,
    pub total_chars: usize,
    pub elapsed_secs: f64,
    pub passed: bool,
    pub timestamp: DateTime<Utc>,
}

impl SessionResult {
    pub fn from_state(state: &GameState, passed: bool, now: Instant) -> Self {
        let end = state.finished_at.unwrap_or(now);
        Self {
            level: state.level.to_key(),
            wpm: state.stats.wpm,
            accuracy: state.stats.accuracy,
            correct: state.stats.correct_chars,
            errors: state.stats.errors,
            total_chars: state.stats.total_chars,
            elapsed_secs: state.stats.elapsed(end).as_secs_f64(),
            passed,
            timestamp: Utc::now(),
        }
    }
}
