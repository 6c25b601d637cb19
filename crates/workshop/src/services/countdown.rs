//! Countdown to Christmas.

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};
use serde::Serialize;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Time left until 25 December 00:00 UTC of the current year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Countdown as seen at `now`. Once Christmas has started every field is
    /// zero until the year rolls over.
    #[must_use]
    pub fn at(now: DateTime<Utc>) -> Self {
        let remaining = christmas(now.year())
            .map_or(TimeDelta::zero(), |target| target - now)
            .num_seconds()
            .max(0);

        Self {
            days: remaining / SECONDS_PER_DAY,
            hours: remaining % SECONDS_PER_DAY / SECONDS_PER_HOUR,
            minutes: remaining % SECONDS_PER_HOUR / SECONDS_PER_MINUTE,
            seconds: remaining % SECONDS_PER_MINUTE,
        }
    }

    #[must_use]
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }
}

fn christmas(year: i32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, 12, 25)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
