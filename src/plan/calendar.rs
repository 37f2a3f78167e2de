//! Calendar classification: weekend detection and frequency-class gating.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::device::Frequency;

/// Number of days in the planning horizon.
pub const HORIZON_DAYS: u32 = 30;

/// Calendar date of the 1-based `day_number` relative to `start`.
pub fn date_of(start: NaiveDate, day_number: u32) -> NaiveDate {
    start
        .checked_add_days(Days::new(u64::from(day_number - 1)))
        .unwrap_or(start)
}

/// Returns `true` when `date` falls on a Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Whether a device with the given frequency class may run on `day_number`.
///
/// The `frequently`/`rarely` cadence is a pure function of the day index
/// (`mod 10`), deliberately date-independent so the same horizon always
/// yields the same eligibility pattern.
pub fn runs_on_day(frequency: Frequency, start: NaiveDate, day_number: u32) -> bool {
    match frequency {
        Frequency::Daily => true,
        Frequency::Weekends => is_weekend(date_of(start, day_number)),
        Frequency::Frequently => day_number % 10 < 3,
        Frequency::Rarely => day_number % 10 == 1,
    }
}
