use std::time::{Duration, Instant};

/// Default quiet period before a typed search term is applied
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 800;

/// Holds back a value until no new value has arrived for `delay`.
///
/// Every `push` restarts the timer and replaces the pending value; `poll`
/// hands the latest value out once the quiet period is over.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    last_event: Option<Instant>,
    pending: Option<T>,
}

impl<T> Debouncer<T> {
    pub fn new(delay_ms: u64) -> Self {
        Self::with_delay(Duration::from_millis(delay_ms))
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            last_event: None,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn push(&mut self, value: T) {
        self.push_at(value, Instant::now());
    }

    pub fn push_at(&mut self, value: T, now: Instant) {
        self.last_event = Some(now);
        self.pending = Some(value);
    }

    /// The pending value, if the quiet period has elapsed
    pub fn poll(&mut self) -> Option<T> {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> Option<T> {
        let last = self.last_event?;
        if now.saturating_duration_since(last) < self.delay {
            return None;
        }
        self.last_event = None;
        self.pending.take()
    }

    /// Hand out the pending value immediately (e.g. on Enter)
    pub fn flush(&mut self) -> Option<T> {
        self.last_event = None;
        self.pending.take()
    }

    /// Time left before the pending value is released; None if idle
    pub fn time_remaining(&self) -> Option<Duration> {
        self.time_remaining_at(Instant::now())
    }

    pub fn time_remaining_at(&self, now: Instant) -> Option<Duration> {
        let last = self.last_event?;
        Some(self.delay.saturating_sub(now.saturating_duration_since(last)))
    }

    /// Drop the pending value
    pub fn reset(&mut self) {
        self.last_event = None;
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_releases_latest_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(800);

        debouncer.push_at("t", start);
        debouncer.push_at("to", start + Duration::from_millis(300));
        debouncer.push_at("tow", start + Duration::from_millis(600));

        assert_eq!(debouncer.poll_at(start + Duration::from_millis(1000)), None);
        assert_eq!(
            debouncer.time_remaining_at(start + Duration::from_millis(1000)),
            Some(Duration::from_millis(400))
        );
        assert_eq!(
            debouncer.poll_at(start + Duration::from_millis(1400)),
            Some("tow")
        );
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll_at(start + Duration::from_millis(5000)), None);
    }

    #[test]
    fn test_flush_and_reset() {
        let mut debouncer = Debouncer::<String>::default();
        assert_eq!(debouncer.delay(), Duration::from_millis(800));

        debouncer.push("lift".to_string());
        assert_eq!(debouncer.flush().as_deref(), Some("lift"));
        assert_eq!(debouncer.time_remaining(), None);

        debouncer.push("door".to_string());
        debouncer.reset();
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.flush(), None);
    }
}
