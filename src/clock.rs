//! Wall-clock time source and remaining-time formatting
//!
//! Countdowns keep an absolute deadline and recompute what is left from the
//! wall clock on every poll, so they survive short suspensions without
//! accumulating drift.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Source of the current wall-clock time
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
///
/// Lets callers simulate sleeping through a deadline.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward (or backward, for a negative duration)
    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|e| *e.into_inner())
    }
}

/// Seconds between `now` and `deadline`; negative once the deadline has passed
pub fn remaining_seconds(deadline: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (deadline - now).num_milliseconds() as f64 / 1000.0
}

/// Format remaining seconds as zero-padded `MM:SS`, never below `00:00`
pub fn format_time_left(remaining_seconds: f64) -> String {
    let total = if remaining_seconds.is_finite() && remaining_seconds > 0.0 {
        remaining_seconds.trunc() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time_left(125.0), "02:05");
        assert_eq!(format_time_left(1500.0), "25:00");
        assert_eq!(format_time_left(59.9), "00:59");
    }

    #[test]
    fn clamps_at_zero() {
        assert_eq!(format_time_left(0.0), "00:00");
        assert_eq!(format_time_left(-0.4), "00:00");
        assert_eq!(format_time_left(-61.0), "00:00");
        assert_eq!(format_time_left(f64::NAN), "00:00");
    }

    #[test]
    fn remaining_goes_negative_after_deadline() {
        let clock = ManualClock::default();
        let deadline = clock.now() + Duration::seconds(10);

        assert_eq!(remaining_seconds(deadline, clock.now()), 10.0);
        clock.advance(Duration::milliseconds(12_500));
        assert_eq!(remaining_seconds(deadline, clock.now()), -2.5);
    }

    proptest! {
        #[test]
        fn formatted_seconds_stay_below_sixty(secs in -10_000.0f64..100_000.0) {
            let text = format_time_left(secs);
            let (minutes, seconds) = text.split_once(':').unwrap();
            prop_assert_eq!(seconds.len(), 2);
            prop_assert!(minutes.len() >= 2);
            prop_assert!(seconds.parse::<u32>().unwrap() < 60);
        }
    }
}
