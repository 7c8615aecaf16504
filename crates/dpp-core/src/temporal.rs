//! # Clock Abstraction
//!
//! All time reads in the stack flow through the [`Clock`] trait instead of
//! calling `Utc::now()` inline. Production code injects [`SystemClock`];
//! tests inject [`FixedClock`] and advance it explicitly, which makes the
//! timeline deriver and the application number generator deterministic
//! under test.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::ValidationError;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// The current instant in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// The current instant as milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Wall-clock time. The only [`Clock`] used outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to an explicit instant, advanced manually.
///
/// Shared freely across threads; `advance`/`set` are visible to every
/// holder, so a test can submit an application, move time forward four
/// days, and observe the derived timeline change.
#[derive(Debug)]
pub struct FixedClock {
    instant: std::sync::Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock pinned to `instant`.
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: std::sync::Mutex::new(instant),
        }
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut guard = self.instant.lock().expect("fixed clock lock poisoned");
        *guard = *guard + delta;
    }

    /// Pin the clock to a new instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut guard = self.instant.lock().expect("fixed clock lock poisoned");
        *guard = instant;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock().expect("fixed clock lock poisoned")
    }
}

/// Plausibility bounds for a submitted date of birth: not in the future
/// and not more than 120 completed years before `today`.
///
/// # Errors
///
/// Returns [`ValidationError::ImplausibleDateOfBirth`] when the bound is
/// violated.
pub fn validate_date_of_birth(dob: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    match today.years_since(dob) {
        // `years_since` is None when `dob` is after `today`.
        None => Err(ValidationError::ImplausibleDateOfBirth(dob)),
        Some(age) if age > 120 => Err(ValidationError::ImplausibleDateOfBirth(dob)),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn fixed_clock_holds_and_advances() {
        let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::new(t0);
        assert_eq!(clock.now(), t0);

        clock.advance(Duration::days(4));
        assert_eq!(clock.now(), t0 + Duration::days(4));

        clock.set(t0);
        assert_eq!(clock.now(), t0);
    }

    #[test]
    fn fixed_clock_millis_match_instant() {
        let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(t0);
        assert_eq!(clock.now_millis(), t0.timestamp_millis());
    }

    #[test]
    fn dob_today_is_plausible() {
        let today = date(2025, 6, 1);
        assert!(validate_date_of_birth(today, today).is_ok());
    }

    #[test]
    fn dob_in_future_rejected() {
        let today = date(2025, 6, 1);
        assert!(validate_date_of_birth(date(2025, 6, 2), today).is_err());
    }

    #[test]
    fn dob_120_years_boundary() {
        let today = date(2025, 6, 1);
        // Exactly 120 completed years is still accepted.
        assert!(validate_date_of_birth(date(1905, 6, 1), today).is_ok());
        // 121 completed years is not.
        assert!(validate_date_of_birth(date(1904, 5, 31), today).is_err());
    }
}
