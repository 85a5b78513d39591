use std::time::{Duration, Instant};

/// Single-slot deferred task: scheduling replaces whatever was pending.
///
/// Time is passed in by the caller, so hosts drive it from their own clock
/// and tests step it explicitly.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    slot: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, slot: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns `true` if an earlier task was superseded.
    pub fn schedule(&mut self, now: Instant, task: T) -> bool {
        self.slot.replace((now + self.delay, task)).is_some()
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.slot.take().map(|(_, task)| task)
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.slot.as_ref().map(|(at, _)| *at)
    }

    /// The pending task, if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.slot {
            Some((at, _)) if *at <= now => self.cancel(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescheduling_collapses_to_last() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));
        assert!(!d.schedule(t0, "b"));
        assert!(d.schedule(t0 + Duration::from_millis(100), "ba"));
        assert!(d.schedule(t0 + Duration::from_millis(200), "ban"));

        assert_eq!(d.take_due(t0 + Duration::from_millis(400)), None);
        assert_eq!(d.deadline(), Some(t0 + Duration::from_millis(500)));
        assert_eq!(d.take_due(t0 + Duration::from_millis(500)), Some("ban"));
        assert!(!d.is_pending());
        assert_eq!(d.take_due(t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn cancel_drops_pending() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::ZERO);
        d.schedule(t0, 1);
        assert_eq!(d.cancel(), Some(1));
        assert_eq!(d.take_due(t0), None);
    }
}
