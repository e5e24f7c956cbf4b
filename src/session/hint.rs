use std::time::{Duration, Instant};

/// A single cancellable deadline. Scheduling replaces whatever was pending.
///
/// The owner polls it from its event loop; `poll` reports the deadline at
/// most once per `schedule`.
#[derive(Clone, Debug)]
pub struct HintTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl HintTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Takes effect from the next `schedule`.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True if the deadline has passed; the timer is disarmed afterwards.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_delay() {
        let t0 = Instant::now();
        let mut timer = HintTimer::new(Duration::from_secs(3));
        timer.schedule(t0);

        assert!(!timer.poll(t0 + Duration::from_secs(2)));
        assert!(timer.poll(t0 + Duration::from_secs(3)));
        assert!(!timer.poll(t0 + Duration::from_secs(10)));
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_reschedule_pushes_deadline_back() {
        let t0 = Instant::now();
        let mut timer = HintTimer::new(Duration::from_secs(3));
        timer.schedule(t0);
        timer.schedule(t0 + Duration::from_secs(2));

        assert!(!timer.poll(t0 + Duration::from_secs(4)));
        assert!(timer.poll(t0 + Duration::from_secs(5)));
    }

    #[test]
    fn test_cancel_disarms() {
        let t0 = Instant::now();
        let mut timer = HintTimer::new(Duration::from_secs(1));
        timer.schedule(t0);
        timer.cancel();
        assert!(!timer.is_pending());
        assert!(!timer.poll(t0 + Duration::from_secs(60)));
    }
}
