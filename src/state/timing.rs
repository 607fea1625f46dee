//! Rate limiting for event handlers
//!
//! Both helpers are plain state machines driven by an explicit `now`, so
//! the owner decides when to poll them (typically once per loop tick).

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct PendingCall<T> {
    deadline: Instant,
    args: T,
}

/// Trailing-edge debounce: runs once, with the latest arguments, after
/// `wait` has passed without a new call
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    wait: Duration,
    pending: Option<PendingCall<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: None,
        }
    }

    /// Schedule a call, superseding any pending one
    pub fn call(&mut self, args: T, now: Instant) {
        self.pending = Some(PendingCall {
            deadline: now + self.wait,
            args,
        });
    }

    /// Take the pending arguments if the quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if now >= p.deadline => self.pending.take().map(|p| p.args),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Leading-edge throttle with a fixed cooldown.
///
/// With `with_trailing`, one call dropped during the cooldown is remembered
/// and released by [`Throttle::poll_trailing`] once the cooldown ends.
#[derive(Debug, Clone)]
pub struct Throttle {
    limit: Duration,
    cooldown_until: Option<Instant>,
    trailing: bool,
    trailing_pending: bool,
}

impl Throttle {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            cooldown_until: None,
            trailing: false,
            trailing_pending: false,
        }
    }

    pub fn with_trailing(limit: Duration) -> Self {
        Self {
            trailing: true,
            ..Self::new(limit)
        }
    }

    pub fn is_cooling(&self, now: Instant) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    /// Returns true when the call should run now
    pub fn try_fire(&mut self, now: Instant) -> bool {
        if self.is_cooling(now) {
            if self.trailing {
                self.trailing_pending = true;
            }
            return false;
        }
        self.cooldown_until = Some(now + self.limit);
        self.trailing_pending = false;
        true
    }

    pub fn has_trailing(&self) -> bool {
        self.trailing_pending
    }

    /// Returns true once after the cooldown if a call was dropped during it
    pub fn poll_trailing(&mut self, now: Instant) -> bool {
        if !self.trailing_pending || self.is_cooling(now) {
            return false;
        }
        self.trailing_pending = false;
        self.cooldown_until = Some(now + self.limit);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    mod debouncer {
        use super::*;

        #[test]
        fn test_burst_fires_once_with_last_args() {
            let start = Instant::now();
            let mut debounce = Debouncer::new(ms(300));
            let mut fired = Vec::new();

            // Five keystrokes within 300ms
            for (i, query) in ["l", "le", "lev", "leve", "lever"].iter().enumerate() {
                let now = start + ms(i as u64 * 60);
                debounce.call(query.to_string(), now);
                if let Some(q) = debounce.poll(now) {
                    fired.push(q);
                }
            }
            for step in 0..20 {
                if let Some(q) = debounce.poll(start + ms(240 + step * 50)) {
                    fired.push(q);
                }
            }

            assert_eq!(fired, vec!["lever".to_string()]);
        }

        #[test]
        fn test_does_not_fire_before_quiet_period() {
            let start = Instant::now();
            let mut debounce = Debouncer::new(ms(150));
            debounce.call((), start);
            assert!(debounce.poll(start + ms(149)).is_none());
            assert!(debounce.poll(start + ms(150)).is_some());
            assert!(!debounce.is_pending());
        }

        #[test]
        fn test_new_call_restarts_quiet_period() {
            let start = Instant::now();
            let mut debounce = Debouncer::new(ms(100));
            debounce.call(1, start);
            debounce.call(2, start + ms(60));
            assert!(debounce.poll(start + ms(100)).is_none());
            assert_eq!(debounce.poll(start + ms(160)), Some(2));
            assert!(debounce.poll(start + ms(500)).is_none());
        }
    }

    mod throttle {
        use super::*;

        #[test]
        fn test_continuous_calls_capped_per_window() {
            let start = Instant::now();
            let mut throttle = Throttle::new(ms(100));
            let fired = (0..50u64)
                .filter(|i| throttle.try_fire(start + ms(i * 10)))
                .count();
            assert!(fired <= 5, "fired {fired} times in 500ms");
            assert_eq!(fired, 5);
        }

        #[test]
        fn test_first_call_fires_immediately() {
            let mut throttle = Throttle::new(ms(100));
            assert!(throttle.try_fire(Instant::now()));
        }

        #[test]
        fn test_leading_only_has_no_trailing_run() {
            let start = Instant::now();
            let mut throttle = Throttle::new(ms(100));
            throttle.try_fire(start);
            throttle.try_fire(start + ms(50));
            assert!(!throttle.poll_trailing(start + ms(200)));
        }

        #[test]
        fn test_trailing_run_after_cooldown() {
            let start = Instant::now();
            let mut throttle = Throttle::with_trailing(ms(100));
            assert!(throttle.try_fire(start));
            assert!(!throttle.try_fire(start + ms(40)));
            assert!(!throttle.poll_trailing(start + ms(90)));
            assert!(throttle.poll_trailing(start + ms(100)));
            // Only once
            assert!(!throttle.poll_trailing(start + ms(300)));
        }

        #[test]
        fn test_trailing_cleared_by_leading_fire() {
            let start = Instant::now();
            let mut throttle = Throttle::with_trailing(ms(100));
            throttle.try_fire(start);
            throttle.try_fire(start + ms(40));
            assert!(throttle.try_fire(start + ms(120)));
            assert!(!throttle.poll_trailing(start + ms(400)));
        }
    }
}
