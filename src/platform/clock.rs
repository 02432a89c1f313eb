use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, FixedOffset, Local};

/// Source of the current wall-clock time.
///
/// Session validity compares epoch milliseconds, while reminder triggers need
/// the device's local offset to resolve a time of day, so the clock hands out
/// offset-aware timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Device clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<FixedOffset>>>,
}

impl ManualClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap();
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_shared_state() {
        let start = DateTime::parse_from_rfc3339("2025-03-01T09:00:00+01:00").unwrap();
        let clock = ManualClock::new(start);
        let observer = clock.clone();

        clock.advance(Duration::minutes(90));

        assert_eq!(observer.now(), start + Duration::minutes(90));
        assert_eq!(observer.now_ms(), start.timestamp_millis() + 90 * 60 * 1000);
    }
}
