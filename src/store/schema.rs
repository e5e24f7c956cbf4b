use serde::{Deserialize, Serialize};

use crate::curriculum::LevelKey;
use crate::engine::progress::UserProgress;
use crate::session::result::SessionResult;

pub const SCHEMA_VERSION: u32 = 1;

/// Most recent sessions kept on disk.
pub const MAX_HISTORY: usize = 200;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressData {
    pub schema_version: u32,
    pub progress: UserProgress,
}

impl Default for ProgressData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            progress: UserProgress::default(),
        }
    }
}

impl ProgressData {
    pub fn new(progress: UserProgress) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            progress,
        }
    }

    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryData {
    pub schema_version: u32,
    pub sessions: Vec<SessionResult>,
}

impl Default for HistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sessions: Vec::new(),
        }
    }
}

impl HistoryData {
    /// Append and drop the oldest entries beyond `MAX_HISTORY`.
    pub fn push(&mut self, result: SessionResult) {
        self.sessions.push(result);
        if self.sessions.len() > MAX_HISTORY {
            let excess = self.sessions.len() - MAX_HISTORY;
            self.sessions.drain(..excess);
        }
    }

    /// Finished runs of `level` still in the history, passed or failed.
    pub fn attempts(&self, level: LevelKey) -> usize {
        let key = level.to_key();
        self.sessions.iter().filter(|s| s.level == key).count()
    }
}
