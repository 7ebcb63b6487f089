//! Cancellable repeating task for a cooperative single-thread loop.
//!
//! The task never runs anything itself. The owner asks whether it is due,
//! does the work, and decides whether to arm it again. Not re-arming is
//! how the repetition stops.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RepeatingTask {
    interval: Duration,
    next_due: Option<Instant>,
}

impl RepeatingTask {
    /// A disarmed task with the given period.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Due immediately.
    pub fn arm_now(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    /// Due one interval after `now`.
    pub fn arm_after(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// If the deadline has passed, disarm and return true.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if due <= now => {
                self.next_due = None;
                true
            }
            _ => false,
        }
    }

    /// Time left until the deadline; `None` when disarmed.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(30);

    #[test]
    fn test_new_task_is_disarmed() {
        let mut task = RepeatingTask::new(TICK);
        let now = Instant::now();
        assert!(!task.is_armed());
        assert!(!task.take_due(now + TICK * 10));
        assert_eq!(task.time_until_due(now), None);
    }

    #[test]
    fn test_take_due_fires_once() {
        let mut task = RepeatingTask::new(TICK);
        let now = Instant::now();
        task.arm_after(now);

        assert!(!task.take_due(now + Duration::from_millis(29)));
        assert!(task.take_due(now + TICK));
        assert!(!task.is_armed());
        assert!(!task.take_due(now + TICK * 2));
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut task = RepeatingTask::new(TICK);
        let now = Instant::now();
        task.arm_now(now);
        task.cancel();
        assert!(!task.take_due(now + TICK));
    }

    #[test]
    fn test_time_until_due_saturates() {
        let mut task = RepeatingTask::new(TICK);
        let now = Instant::now();
        task.arm_after(now);
        assert_eq!(task.time_until_due(now), Some(TICK));
        assert_eq!(task.time_until_due(now + TICK * 2), Some(Duration::ZERO));
    }
}
