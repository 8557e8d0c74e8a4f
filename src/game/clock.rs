//! Wall-clock adapter.
//!
//! Everything time-dependent in the engine reads the current time through a
//! [`Clock`] so tests can pin it. Timestamps are milliseconds since the Unix
//! epoch, matching `Date.now()` on the JS side and the backend's
//! `trainingTarget` values.

use std::cell::Cell;

pub type Timestamp = u64;

pub trait Clock {
    fn now_ms(&self) -> Timestamp;
}

/// Real time. `Date.now()` inside the browser, `SystemTime` natively.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> Timestamp {
        js_sys::Date::now().max(0.0) as Timestamp
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as Timestamp)
            .unwrap_or(0)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Timestamp {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now_ms(&self) -> Timestamp {
        (**self).now_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn manual_clock_moves_only_on_demand() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_ms(), 1_000);
        clock.advance(500);
        assert_eq!(clock.now_ms(), 1_500);
        clock.set(42);
        assert_eq!(clock.now_ms(), 42);
    }

    #[test]
    fn shared_manual_clock_is_observed_through_rc() {
        let clock = Rc::new(ManualClock::new(0));
        let handle: Box<dyn Clock> = Box::new(Rc::clone(&clock));
        clock.advance(86_400_000);
        assert_eq!(handle.now_ms(), 86_400_000);
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }
}
