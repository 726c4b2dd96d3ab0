use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A totally-ordered series key. Dates, date-times, decimals and strings
/// all qualify.
pub trait SeriesKey: Ord + Clone + Debug {}

impl<T: Ord + Clone + Debug> SeriesKey for T {}

/// How a lag step counts days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LagDaySelection {
    /// Every calendar day counts.
    AnyDay,
    /// Only Monday through Friday count; weekends are skipped over.
    Weekday,
}

/// A key with calendar structure: it can step by calendar days or by
/// weekdays, and measure its distance to another key in whole days.
///
/// One trait covers both date-only and date-time keys, so lagging and
/// periodicity detection are written once.
pub trait CalendarKey: SeriesKey {
    /// Shifts by `days` calendar days (negative shifts backwards).
    fn add_days(&self, days: i64) -> Self;

    /// Shifts by `steps` weekdays, skipping Saturdays and Sundays in the
    /// direction of travel. Zero steps is the identity.
    fn add_weekdays(&self, steps: i64) -> Self {
        let mut key = self.clone();
        let direction = if steps >= 0 { 1 } else { -1 };
        let mut remaining = steps.abs();
        while remaining > 0 {
            key = key.add_days(direction);
            if key.is_weekday() {
                remaining -= 1;
            }
        }
        key
    }

    /// Whole days from `self` to `other` (negative if `other` is earlier).
    fn days_between(&self, other: &Self) -> i64;

    /// True for Monday through Friday.
    fn is_weekday(&self) -> bool;

    /// Applies a signed lag under the given day-selection mode.
    fn lag(&self, days: i64, mode: LagDaySelection) -> Self {
        match mode {
            LagDaySelection::AnyDay => self.add_days(days),
            LagDaySelection::Weekday => self.add_weekdays(days),
        }
    }
}

impl CalendarKey for NaiveDate {
    fn add_days(&self, days: i64) -> Self {
        *self + Duration::days(days)
    }

    fn days_between(&self, other: &Self) -> i64 {
        (*other - *self).num_days()
    }

    fn is_weekday(&self) -> bool {
        !matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

impl CalendarKey for DateTime<Utc> {
    fn add_days(&self, days: i64) -> Self {
        *self + Duration::days(days)
    }

    fn days_between(&self, other: &Self) -> i64 {
        (*other - *self).num_days()
    }

    fn is_weekday(&self) -> bool {
        !matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }
}
