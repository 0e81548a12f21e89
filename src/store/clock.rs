//! Wall clock used to stamp clock actions and adjustment rows.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, Utc};
use parking_lot::Mutex;

pub use mockable::{Clock, DefaultClock};

/// A clock shareable across request handlers.
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_moves_only_when_told() {
        let start = Utc.with_ymd_and_hms(2025, 1, 14, 9, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.utc(), start);

        clock.advance(Duration::hours(4));
        assert_eq!(clock.utc(), Utc.with_ymd_and_hms(2025, 1, 14, 13, 0, 0).unwrap());

        clock.set(start);
        assert_eq!(clock.utc(), start);
    }
}
