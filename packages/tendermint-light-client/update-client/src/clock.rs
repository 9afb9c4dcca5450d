//! Sources of the current time

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time in unix nanoseconds
pub trait Clock {
    /// Now, in unix nanoseconds
    fn now(&self) -> u64;
}

/// Wall clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
    }
}

/// A clock that always reports the same instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl FixedClock {
    /// Moves the clock forward by `nanos`
    pub fn advance(&mut self, nanos: u64) {
        self.0 = self.0.saturating_add(nanos);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}
