use std::time::{Duration, Instant};

const CHARS_PER_WORD: f64 = 5.0;
/// Lower bound on elapsed time so the first keystroke doesn't divide by ~0.
const MIN_ELAPSED: Duration = Duration::from_secs(1);

pub fn words_per_minute(total_chars: usize, elapsed: Duration) -> u32 {
    let minutes = elapsed.max(MIN_ELAPSED).as_secs_f64() / 60.0;
    ((total_chars as f64 / CHARS_PER_WORD) / minutes).floor() as u32
}

/// Whole-percent accuracy, rounded down. No keystrokes counts as 100%.
pub fn accuracy_percent(correct_chars: usize, total_chars: usize) -> u32 {
    if total_chars == 0 {
        return 100;
    }
    (correct_chars.min(total_chars) * 100 / total_chars) as u32
}

/// Running statistics for one practice session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameStats {
    pub wpm: u32,
    pub accuracy: u32,
    pub total_chars: usize,
    pub correct_chars: usize,
    pub errors: usize,
    pub started_at: Option<Instant>,
}

impl Default for GameStats {
    fn default() -> Self {
        Self {
            wpm: 0,
            accuracy: 100,
            total_chars: 0,
            correct_chars: 0,
            errors: 0,
            started_at: None,
        }
    }
}

impl GameStats {
    /// Count one keystroke and refresh the derived figures. The session clock
    /// starts at the first recorded keystroke.
    pub fn record(&mut self, correct: bool, now: Instant) {
        self.started_at.get_or_insert(now);
        self.total_chars += 1;
        if correct {
            self.correct_chars += 1;
        } else {
            self.errors += 1;
        }
        self.recompute(now);
    }

    pub fn recompute(&mut self, now: Instant) {
        self.wpm = words_per_minute(self.total_chars, self.elapsed(now));
        self.accuracy = accuracy_percent(self.correct_chars, self.total_chars);
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wpm_one_minute() {
        assert_eq!(words_per_minute(250, Duration::from_secs(60)), 50);
    }

    #[test]
    fn test_wpm_rounds_down() {
        // 12 chars / 5 = 2.4 words in 30s = 4.8 wpm
        assert_eq!(words_per_minute(12, Duration::from_secs(30)), 4);
    }

    #[test]
    fn test_wpm_clamps_tiny_elapsed() {
        assert_eq!(words_per_minute(5, Duration::ZERO), 60);
        assert_eq!(words_per_minute(5, Duration::from_millis(10)), 60);
    }

    #[test]
    fn test_accuracy_floor() {
        assert_eq!(accuracy_percent(3, 4), 75);
        assert_eq!(accuracy_percent(2, 3), 66);
        assert_eq!(accuracy_percent(0, 7), 0);
        assert_eq!(accuracy_percent(7, 7), 100);
        assert_eq!(accuracy_percent(0, 0), 100);
    }

    #[test]
    fn test_accuracy_always_in_range() {
        for total in 1..60 {
            for correct in 0..=total {
                let acc = accuracy_percent(correct, total);
                assert!(acc <= 100);
                assert_eq!(acc as usize, correct * 100 / total);
            }
        }
    }

    #[test]
    fn test_record_counts_and_clock() {
        let t0 = Instant::now();
        let mut stats = GameStats::default();
        stats.record(true, t0);
        stats.record(false, t0 + Duration::from_secs(1));
        stats.record(true, t0 + Duration::from_secs(2));

        assert_eq!(stats.started_at, Some(t0));
        assert_eq!(stats.total_chars, 3);
        assert_eq!(stats.correct_chars, 2);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.accuracy, 66);
        assert_eq!(stats.elapsed(t0 + Duration::from_secs(2)), Duration::from_secs(2));
    }

    #[test]
    fn test_default_is_clean() {
        let stats = GameStats::default();
        assert_eq!(stats.accuracy, 100);
        assert_eq!(stats.wpm, 0);
        assert_eq!(stats.elapsed(Instant::now()), Duration::ZERO);
    }
}
