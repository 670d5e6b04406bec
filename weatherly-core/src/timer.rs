use std::time::{Duration, Instant};

/// A recurring schedule with at most one pending deadline.
///
/// Starting always replaces the previous schedule, so a timer can never stack.
#[derive(Debug, Clone)]
pub struct Timer {
    period: Duration,
    deadline: Option<Instant>,
    starts: u64,
}

impl Timer {
    pub fn new(period: Duration) -> Self {
        Self { period, deadline: None, starts: 0 }
    }

    /// Stop any pending schedule and arm a fresh one from `now`.
    pub fn start(&mut self, now: Instant) {
        self.stop();
        self.deadline = Some(now + self.period);
        self.starts += 1;
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// How many times the timer has been armed.
    pub fn starts(&self) -> u64 {
        self.starts
    }

    /// Fire at most once, re-arming one period after `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = Some(now + self.period);
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
    fn fires_once_per_period() {
        let now = Instant::now();
        let mut timer = Timer::new(Duration::from_secs(300));
        timer.start(now);

        assert!(!timer.poll(now + Duration::from_secs(299)));
        assert!(timer.poll(now + Duration::from_secs(300)));
        assert!(!timer.poll(now + Duration::from_secs(301)));
        assert!(timer.poll(now + Duration::from_secs(600)));
    }

    #[test]
    fn restart_replaces_pending_deadline() {
        let now = Instant::now();
        let mut timer = Timer::new(Duration::from_secs(10));

        timer.start(now);
        timer.start(now + Duration::from_secs(5));

        assert_eq!(timer.next_deadline(), Some(now + Duration::from_secs(15)));
        assert!(!timer.poll(now + Duration::from_secs(10)));
        assert_eq!(timer.starts(), 2);
    }

    #[test]
    fn stopped_timer_never_fires() {
        let now = Instant::now();
        let mut timer = Timer::new(Duration::from_secs(1));
        timer.start(now);
        timer.stop();

        assert!(!timer.is_armed());
        assert!(!timer.poll(now + Duration::from_secs(60)));
    }

    #[test]
    fn late_poll_does_not_burst() {
        let now = Instant::now();
        let mut timer = Timer::new(Duration::from_secs(1));
        timer.start(now);

        let late = now + Duration::from_secs(10);
        assert!(timer.poll(late));
        assert!(!timer.poll(late));
        assert_eq!(timer.next_deadline(), Some(late + Duration::from_secs(1)));
    }
}
