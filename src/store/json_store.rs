use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{info, warn};
use serde::{Serialize, de::DeserializeOwned};

use crate::engine::progress::UserProgress;
use crate::session::result::SessionResult;
use crate::store::schema::{HistoryData, ProgressData};

const PROGRESS_FILE: &str = "progress.json";
const HISTORY_FILE: &str = "history.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(Self::default_dir())
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keystep")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Missing files give the default; unreadable or malformed ones are
    /// logged and also give the default.
    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("could not read {}: {e}; using defaults", path.display());
                return T::default();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("could not parse {}: {e}; using defaults", path.display());
            T::default()
        })
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn load_progress(&self) -> UserProgress {
        let data: ProgressData = self.load(PROGRESS_FILE);
        if data.needs_reset() {
            warn!(
                "progress schema version {} is not supported; starting fresh",
                data.schema_version
            );
            return UserProgress::default();
        }
        let mut progress = data.progress;
        progress.ensure_first_unlocked();
        progress
    }

    pub fn save_progress(&self, progress: &UserProgress) -> Result<()> {
        self.save(PROGRESS_FILE, &ProgressData::new(progress.clone()))
    }

    pub fn load_history(&self) -> HistoryData {
        self.load(HISTORY_FILE)
    }

    pub fn save_history(&self, data: &HistoryData) -> Result<()> {
        self.save(HISTORY_FILE, data)
    }

    pub fn append_session(&self, result: SessionResult) -> Result<HistoryData> {
        let mut history = self.load_history();
        history.push(result);
        self.save_history(&history)?;
        Ok(history)
    }

    /// Delete saved progress and history. Settings are left alone.
    pub fn reset(&self) -> Result<()> {
        for name in [PROGRESS_FILE, HISTORY_FILE] {
            let path = self.file_path(name);
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        info!("progress reset in {}", self.base_dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::TempDir;

    use super::*;
    use crate::curriculum::{Curriculum, LevelKey};
    use crate::store::schema::MAX_HISTORY;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    fn session(level: &str) -> SessionResult {
        SessionResult {
            level: level.to_string(),
            wpm: 30,
            accuracy: 95,
            correct: 19,
            errors: 1,
            total_chars: 20,
            elapsed_secs: 8.0,
            passed: true,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_fresh_store_has_default_progress() {
        let (_dir, store) = make_test_store();
        assert_eq!(store.load_progress(), UserProgress::default());
        assert!(store.load_history().sessions.is_empty());
    }

    #[test]
    fn test_progress_round_trip() {
        let (_dir, store) = make_test_store();
        let mut progress = UserProgress::default();
        progress.record_success(&Curriculum::default(), LevelKey::FIRST, 98, 33);
        store.save_progress(&progress).unwrap();

        assert_eq!(store.load_progress(), progress);
        assert!(!store.file_path("progress.tmp").exists());
    }

    #[test]
    fn test_corrupt_progress_falls_back_to_default() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(PROGRESS_FILE), "{ not json").unwrap();
        assert_eq!(store.load_progress(), UserProgress::default());
    }

    #[test]
    fn test_stale_schema_resets() {
        let (_dir, store) = make_test_store();
        let mut data = ProgressData::default();
        data.schema_version = 99;
        data.progress.unlock(LevelKey::new(3, 0));
        store.save(PROGRESS_FILE, &data).unwrap();

        assert_eq!(store.load_progress(), UserProgress::default());
    }

    #[test]
    fn test_loaded_progress_always_has_first_level() {
        let (_dir, store) = make_test_store();
        fs::write(
            store.file_path(PROGRESS_FILE),
            r#"{"schema_version":1,"progress":{"records":{}}}"#,
        )
        .unwrap();
        assert!(store.load_progress().is_unlocked(LevelKey::FIRST));
    }

    #[test]
    fn test_history_is_capped() {
        let (_dir, store) = make_test_store();
        let mut history = HistoryData::default();
        for i in 0..MAX_HISTORY + 5 {
            history.push(session(&format!("0-{i}")));
        }
        store.save_history(&history).unwrap();

        let loaded = store.load_history();
        assert_eq!(loaded.sessions.len(), MAX_HISTORY);
        assert_eq!(loaded.sessions[0].level, "0-5");
    }

    #[test]
    fn test_append_session_persists() {
        let (_dir, store) = make_test_store();
        store.append_session(session("0-0")).unwrap();
        let history = store.append_session(session("0-1")).unwrap();
        assert_eq!(history.sessions.len(), 2);
        assert_eq!(store.load_history(), history);
    }

    #[test]
    fn test_reset_removes_files() {
        let (_dir, store) = make_test_store();
        store.save_progress(&UserProgress::default()).unwrap();
        store.append_session(session("0-0")).unwrap();

        store.reset().unwrap();

        assert!(!store.file_path(PROGRESS_FILE).exists());
        assert!(!store.file_path(HISTORY_FILE).exists());
        // Resetting an empty store is fine
        store.reset().unwrap();
    }

    #[test]
    fn test_history_counts_attempts_per_level() {
        let (_dir, store) = make_test_store();
        let mut failed = session("0-0");
        failed.passed = false;
        store.append_session(failed).unwrap();
        store.append_session(session("0-0")).unwrap();
        store.append_session(session("0-1")).unwrap();

        let history = store.load_history();
        assert_eq!(history.attempts(LevelKey::FIRST), 2);
        assert_eq!(history.attempts(LevelKey::new(0, 1)), 1);
        assert_eq!(history.attempts(LevelKey::new(1, 0)), 0);
    }
}
