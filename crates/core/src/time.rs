use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Timelike};

/// A simple clock abstraction for deterministic time in services and tests.
///
/// Progress timestamps are wall-clock local time: streaks are counted in the
/// learner's calendar days, not UTC days.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(NaiveDateTime),
}

impl Clock {
    /// Returns a clock that uses the current local time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: NaiveDateTime) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock, truncated to whole seconds.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        let now = match self {
            Clock::Default => Local::now().naive_local(),
            Clock::Fixed(t) => *t,
        };
        now.with_nanosecond(0).unwrap_or(now)
    }

    /// Calendar day of `now()`.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Deterministic date for tests and examples (2024-01-05).
pub const FIXED_TEST_DATE: (i32, u32, u32) = (2024, 1, 5);

/// Returns a deterministic timestamp (2024-01-05 09:30:00) for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> NaiveDateTime {
    let (y, m, d) = FIXED_TEST_DATE;
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(9, 30, 0))
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
