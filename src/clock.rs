use std::cell::Cell;

use chrono::{DateTime, Duration, Utc};

/// A source of the current time.
///
/// "Election ended" is never stored; every time-sensitive operation
/// re-derives it by comparing `now()` against the fixed end time, so the
/// whole lifecycle can be driven in tests with a [`ManualClock`].
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

// A borrowed clock is still a clock, so a test can keep hold of a
// `ManualClock` and advance it while a ledger reads from it.
impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Wall-clock time. The default for production use.
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Intended for tests.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Move the clock forwards (or backwards, with a negative duration).
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Jump straight to a specific instant.
    pub fn set(&self, to: DateTime<Utc>) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}
