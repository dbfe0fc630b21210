//! Debounced, single-flight analysis scheduling.
//!
//! A reset-on-activity timer modelled as an explicit state machine, so the
//! coalescing and single-flight rules can be checked without any runtime.
//!
//! ## States
//!
//! ```text
//!            notify(now)                    deadline reached, idle worker
//!   Idle ─────────────────> PendingAt(d) ─────────────────────────────────> Idle + in flight
//!                             │     ^                                              │
//!                             └─────┘ notify(now): d = now + delay                 │ complete()
//!                                                                                  v
//!                                                                          Idle, worker free
//! ```
//!
//! A burst of edits keeps pushing the deadline out, so N edits closer
//! together than `delay` produce exactly one firing, `delay` after the last
//! edit. While an analysis is in flight the deadline may pass, but firing is
//! held back until [`Debouncer::complete`] is called: at most one analysis
//! runs at a time.
//!
//! Instants are passed in rather than read from a clock, so callers decide
//! what "now" is (the session uses Tokio's clock, which tests can pause).

use std::time::Duration;

use tokio::time::Instant;

/// Timer state of a [`Debouncer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// Nothing scheduled.
    Idle,
    /// An analysis is due at the given instant.
    PendingAt(Instant),
}

/// Single-slot debouncer with an in-flight gate.
///
/// ## Example
///
/// ```rust
/// use std::time::Duration;
/// use tokio::time::Instant;
/// use proofline::Debouncer;
///
/// let mut debouncer = Debouncer::new(Duration::from_millis(300));
/// let t0 = Instant::now();
///
/// debouncer.notify(t0);
/// debouncer.notify(t0 + Duration::from_millis(100));
///
/// // Deadline was pushed to 400ms after t0.
/// assert!(!debouncer.poll_fire(t0 + Duration::from_millis(399)));
/// assert!(debouncer.poll_fire(t0 + Duration::from_millis(400)));
/// assert!(debouncer.is_in_flight());
/// ```
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    state: DebounceState,
    in_flight: bool,
}

impl Debouncer {
    /// Create an idle debouncer.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: DebounceState::Idle,
            in_flight: false,
        }
    }

    /// The quiet period required before firing.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Current timer state.
    #[must_use]
    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Whether an analysis has fired and not yet completed.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Record an edit: replace any pending deadline with `now + delay`.
    pub fn notify(&mut self, now: Instant) -> Instant {
        let deadline = now + self.delay;
        self.state = DebounceState::PendingAt(deadline);
        deadline
    }

    /// Make the next firing due immediately, skipping the quiet period.
    pub fn trigger(&mut self, now: Instant) {
        self.state = DebounceState::PendingAt(now);
    }

    /// Drop any pending deadline. An in-flight analysis is unaffected.
    pub fn cancel(&mut self) {
        self.state = DebounceState::Idle;
    }

    /// When the caller should next call [`poll_fire`](Self::poll_fire).
    ///
    /// `None` while idle or while an analysis is in flight.
    #[must_use]
    pub fn next_fire(&self) -> Option<Instant> {
        match self.state {
            DebounceState::PendingAt(deadline) if !self.in_flight => Some(deadline),
            _ => None,
        }
    }

    /// Fire if the deadline has passed and no analysis is running.
    ///
    /// Returns `true` exactly once per deadline; the debouncer is then idle
    /// and in flight until [`complete`](Self::complete).
    pub fn poll_fire(&mut self, now: Instant) -> bool {
        match self.state {
            DebounceState::PendingAt(deadline) if !self.in_flight && now >= deadline => {
                self.state = DebounceState::Idle;
                self.in_flight = true;
                true
            }
            _ => false,
        }
    }

    /// Mark the running analysis as finished (successfully or not).
    pub fn complete(&mut self) {
        self.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_starts_idle() {
        let debouncer = Debouncer::new(DELAY);
        assert_eq!(debouncer.state(), DebounceState::Idle);
        assert_eq!(debouncer.next_fire(), None);
        assert!(!debouncer.is_in_flight());
    }

    #[test]
    fn test_burst_fires_once() {
        let mut debouncer = Debouncer::new(DELAY);
        let t0 = Instant::now();

        let mut fired = 0;
        for i in 0..10 {
            let now = t0 + ms(i * 100);
            debouncer.notify(now);
            if debouncer.poll_fire(now) {
                fired += 1;
            }
        }
        assert_eq!(fired, 0);

        let last = t0 + ms(900);
        assert_eq!(debouncer.next_fire(), Some(last + DELAY));
        assert!(debouncer.poll_fire(last + DELAY));
        assert!(!debouncer.poll_fire(last + DELAY + ms(1)));
    }

    #[test]
    fn test_single_flight() {
        let mut debouncer = Debouncer::new(DELAY);
        let t0 = Instant::now();

        debouncer.notify(t0);
        assert!(debouncer.poll_fire(t0 + DELAY));

        // An edit during the analysis schedules another run, but it waits.
        debouncer.notify(t0 + ms(310));
        assert_eq!(debouncer.next_fire(), None);
        assert!(!debouncer.poll_fire(t0 + ms(2000)));

        debouncer.complete();
        assert_eq!(debouncer.next_fire(), Some(t0 + ms(610)));
        assert!(debouncer.poll_fire(t0 + ms(2000)));
    }

    #[test]
    fn test_trigger_skips_wait() {
        let mut debouncer = Debouncer::new(DELAY);
        let t0 = Instant::now();
        debouncer.notify(t0);
        debouncer.trigger(t0);
        assert!(debouncer.poll_fire(t0));
    }

    #[test]
    fn test_cancel() {
        let mut debouncer = Debouncer::new(DELAY);
        let t0 = Instant::now();
        debouncer.notify(t0);
        debouncer.cancel();
        assert!(!debouncer.poll_fire(t0 + ms(5000)));
        assert_eq!(debouncer.state(), DebounceState::Idle);
    }
}
