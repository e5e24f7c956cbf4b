use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::curriculum::{Curriculum, LevelKey};

// --- Persisted Progress ---

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRecord {
    pub unlocked: bool,
    pub completed: bool,
    pub best_accuracy: u32,
    pub best_wpm: u32,
    /// Time of the most recent pass.
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub records: BTreeMap<String, LevelRecord>,
}

impl Default for UserProgress {
    fn default() -> Self {
        let mut records = BTreeMap::new();
        // Only the very first level starts unlocked
        records.insert(
            LevelKey::FIRST.to_key(),
            LevelRecord {
                unlocked: true,
                ..LevelRecord::default()
            },
        );
        Self { records }
    }
}

/// What finishing a level did to the level after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// The next level was locked and is now open.
    Unlocked(LevelKey),
    /// The next level had already been unlocked earlier.
    AlreadyUnlocked(LevelKey),
    /// The finished level was the last one in the curriculum.
    CurriculumComplete,
}

impl Advance {
    pub fn next_level(self) -> Option<LevelKey> {
        match self {
            Advance::Unlocked(key) | Advance::AlreadyUnlocked(key) => Some(key),
            Advance::CurriculumComplete => None,
        }
    }
}

// --- Progress Tracker ---

impl UserProgress {
    pub fn record(&self, key: LevelKey) -> Option<&LevelRecord> {
        self.records.get(&key.to_key())
    }

    fn record_mut(&mut self, key: LevelKey) -> &mut LevelRecord {
        self.records.entry(key.to_key()).or_default()
    }

    pub fn is_unlocked(&self, key: LevelKey) -> bool {
        self.record(key).is_some_and(|r| r.unlocked)
    }

    pub fn is_completed(&self, key: LevelKey) -> bool {
        self.record(key).is_some_and(|r| r.completed)
    }

    /// Open a level. Returns true if it was locked before. Never locks.
    pub fn unlock(&mut self, key: LevelKey) -> bool {
        let record = self.record_mut(key);
        let newly = !record.unlocked;
        record.unlocked = true;
        newly
    }

    /// Loaded data may predate the first level's record; make sure the
    /// learner always has somewhere to start.
    pub fn ensure_first_unlocked(&mut self) {
        self.unlock(LevelKey::FIRST);
    }

    /// Mark `key` completed, keep the best scores, and unlock what comes next.
    /// Failed runs never reach the tracker; they only land in the history.
    pub fn record_success(
        &mut self,
        curriculum: &Curriculum,
        key: LevelKey,
        accuracy: u32,
        wpm: u32,
    ) -> Advance {
        let record = self.record_mut(key);
        record.unlocked = true;
        record.completed = true;
        record.last_played = Some(Utc::now());
        record.best_accuracy = record.best_accuracy.max(accuracy);
        record.best_wpm = record.best_wpm.max(wpm);

        match curriculum.next_level_key(key) {
            Some(next) => {
                if self.unlock(next) {
                    info!("unlocked level {next}");
                    Advance::Unlocked(next)
                } else {
                    Advance::AlreadyUnlocked(next)
                }
            }
            None => {
                info!("curriculum complete after level {key}");
                Advance::CurriculumComplete
            }
        }
    }

    pub fn unlocked_count(&self) -> usize {
        self.records.values().filter(|r| r.unlocked).count()
    }

    pub fn completed_count(&self) -> usize {
        self.records.values().filter(|r| r.completed).count()
    }

    /// Share of the curriculum's levels that are completed, in `[0, 1]`.
    pub fn completion_ratio(&self, curriculum: &Curriculum) -> f64 {
        let total = curriculum.total_levels();
        if total == 0 {
            return 0.0;
        }
        let done = curriculum
            .level_keys()
            .into_iter()
            .filter(|&key| self.is_completed(key))
            .count();
        done as f64 / total as f64
    }

    /// The furthest unlocked level, for resuming where the learner left off.
    pub fn latest_unlocked(&self, curriculum: &Curriculum) -> LevelKey {
        curriculum
            .level_keys()
            .into_iter()
            .filter(|&key| self.is_unlocked(key))
            .last()
            .unwrap_or(LevelKey::FIRST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_unlocks_only_first() {
        let progress = UserProgress::default();
        assert!(progress.is_unlocked(LevelKey::FIRST));
        assert!(!progress.is_unlocked(LevelKey::new(0, 1)));
        assert_eq!(progress.unlocked_count(), 1);
        assert_eq!(progress.completed_count(), 0);
    }

    #[test]
    fn test_success_unlocks_next_and_completes_current() {
        let curriculum = Curriculum::default();
        let mut progress = UserProgress::default();

        let advance = progress.record_success(&curriculum, LevelKey::FIRST, 95, 30);

        assert_eq!(advance, Advance::Unlocked(LevelKey::new(0, 1)));
        assert!(progress.records["0-1"].unlocked);
        let first = &progress.records["0-0"];
        assert!(first.completed);
        assert_eq!(first.best_accuracy, 95);
        assert_eq!(first.best_wpm, 30);
    }

    #[test]
    fn test_best_scores_only_improve() {
        let curriculum = Curriculum::default();
        let mut progress = UserProgress::default();
        progress.record_success(&curriculum, LevelKey::FIRST, 95, 40);
        progress.record_success(&curriculum, LevelKey::FIRST, 91, 50);

        let rec = progress.record(LevelKey::FIRST).unwrap();
        assert_eq!(rec.best_accuracy, 95);
        assert_eq!(rec.best_wpm, 50);
    }

    #[test]
    fn test_second_success_reports_already_unlocked() {
        let curriculum = Curriculum::default();
        let mut progress = UserProgress::default();
        progress.record_success(&curriculum, LevelKey::FIRST, 100, 20);
        let again = progress.record_success(&curriculum, LevelKey::FIRST, 100, 20);
        assert_eq!(again, Advance::AlreadyUnlocked(LevelKey::new(0, 1)));
    }

    #[test]
    fn test_unlock_is_monotonic() {
        let curriculum = Curriculum::default();
        let mut progress = UserProgress::default();
        progress.record_success(&curriculum, LevelKey::FIRST, 100, 20);

        // Repeated successes never relock anything
        progress.record_success(&curriculum, LevelKey::FIRST, 10, 1);
        assert!(!progress.unlock(LevelKey::new(0, 1)));

        for key in [LevelKey::FIRST, LevelKey::new(0, 1)] {
            assert!(progress.is_unlocked(key), "{key} relocked");
        }
    }

    #[test]
    fn test_final_level_reports_curriculum_complete() {
        let curriculum = Curriculum::default();
        let mut progress = UserProgress::default();
        let last = *curriculum.level_keys().last().unwrap();
        progress.unlock(last);

        let advance = progress.record_success(&curriculum, last, 100, 60);
        assert_eq!(advance, Advance::CurriculumComplete);
        assert_eq!(advance.next_level(), None);
        assert!(progress.is_completed(last));
    }

    #[test]
    fn test_success_stamps_last_played() {
        let curriculum = Curriculum::default();
        let mut progress = UserProgress::default();
        assert_eq!(progress.record(LevelKey::FIRST).unwrap().last_played, None);

        let before = Utc::now();
        progress.record_success(&curriculum, LevelKey::FIRST, 100, 20);
        let played = progress.record(LevelKey::FIRST).unwrap().last_played.unwrap();
        assert!(played >= before);
    }

    #[test]
    fn test_latest_unlocked_and_ratio() {
        let curriculum = Curriculum::default();
        let mut progress = UserProgress::default();
        assert_eq!(progress.latest_unlocked(&curriculum), LevelKey::FIRST);

        progress.record_success(&curriculum, LevelKey::FIRST, 100, 20);
        progress.record_success(&curriculum, LevelKey::new(0, 1), 100, 20);
        assert_eq!(progress.latest_unlocked(&curriculum), LevelKey::new(0, 2));

        let ratio = progress.completion_ratio(&curriculum);
        let expected = 2.0 / curriculum.total_levels() as f64;
        assert!((ratio - expected).abs() < 1e-9);
    }

    #[test]
    fn test_serde_tolerates_missing_supplementary_fields() {
        // Older files may also carry fields that are no longer stored
        let json = r#"{"records":{"0-0":{"unlocked":true,"completed":true,"best_accuracy":97,"best_wpm":41,"attempts":3}}}"#;
        let progress: UserProgress = serde_json::from_str(json).unwrap();
        let rec = progress.record(LevelKey::FIRST).unwrap();
        assert_eq!(rec.last_played, None);
        assert_eq!(rec.best_wpm, 41);
    }
}
