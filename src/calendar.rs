// Epoch-day <-> calendar date conversion.
// Epoch day 0 is 1970-01-01; a day starts at local midnight, not UTC midnight.

use chrono::{LocalResult, NaiveDate, TimeDelta, TimeZone};
use std::fmt;

/// Calendar date of an epoch day. Saturates at chrono's date range.
pub fn day_to_date(epoch_day: i64) -> NaiveDate {
    TimeDelta::try_days(epoch_day)
        .and_then(|d| NaiveDate::default().checked_add_signed(d))
        .unwrap_or(if epoch_day < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        })
}

/// Epoch day of a calendar date.
pub fn date_to_day(date: NaiveDate) -> i64 {
    date.signed_duration_since(NaiveDate::default()).num_days()
}

/// Renders provider timestamps in a fixed zone.
#[derive(Debug, Clone)]
pub struct Calendar<Tz: TimeZone> {
    tz: Tz,
}

impl<Tz: TimeZone> Calendar<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl<Tz> Calendar<Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    /// Local date-time text for a Unix timestamp, or "never" for 0.
    pub fn format_timestamp(&self, unix_secs: i64) -> String {
        if unix_secs == 0 {
            return "never".to_string();
        }
        match self.tz.timestamp_opt(unix_secs, 0) {
            LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => {
                t.format("%Y-%m-%d %H:%M:%S").to_string()
            }
            LocalResult::None => unix_secs.to_string(),
        }
    }
}
