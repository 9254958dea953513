// Slot selection: which buffer and which day-index range a display range reads.
// Day indices are relative to the aggregate's FirstDay; per-server buffers are reached
// through the batch's slot delta.

use chrono::NaiveDate;
use serde::Serialize;

use super::period::{DisplayRange, Period, YearMonth};
use crate::calendar::{date_to_day, day_to_date};
use crate::models::VolumeSnapshot;

pub const SECOND_SLOTS: usize = 60;
pub const MINUTE_SLOTS: usize = 60;
pub const HOUR_SLOTS: usize = 24;
/// Month charts are always this wide so short months line up with long ones.
pub const MONTH_POINTS: usize = 31;
pub const YEAR_POINTS: usize = 12;

const MENU_MONTHS: usize = 3;
const MENU_YEARS: usize = 2;

/// The aggregate's day clock. Untrusted when FirstDay <= 0 or DaySlot < 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    Trusted { first_day: i64, today: i64 },
    Untrusted,
}

impl Clock {
    pub fn of(aggregate: &VolumeSnapshot) -> Self {
        if aggregate.first_day > 0 && aggregate.day_slot >= 0 {
            Clock::Trusted {
                first_day: aggregate.first_day,
                today: aggregate.first_day + aggregate.day_slot,
            }
        } else {
            Clock::Untrusted
        }
    }

    pub fn is_trusted(&self) -> bool {
        matches!(self, Clock::Trusted { .. })
    }
}

/// Inclusive aggregate day-index range covering a calendar period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub period: Period,
    pub first_date: NaiveDate,
    pub start_index: i64,
    pub end_index: i64,
}

impl PeriodWindow {
    pub fn new(period: Period, first_day: i64) -> Self {
        let first_date = period.first_date();
        Self {
            period,
            first_date,
            start_index: date_to_day(first_date) - first_day,
            end_index: date_to_day(period.last_date()) - first_day,
        }
    }

    pub fn caption(&self) -> String {
        self.period.caption()
    }
}

/// The buffer a display range reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotWindow {
    Seconds,
    Minutes,
    Hours,
    /// One point per day of a month.
    Days(PeriodWindow),
    /// One point per month of a year, folded from the day buffer.
    Months(PeriodWindow),
    /// A month/year was requested but the clock is untrusted.
    NoPeriodData,
}

impl SlotWindow {
    pub fn caption(&self) -> String {
        match self {
            SlotWindow::Seconds => "60 seconds".to_string(),
            SlotWindow::Minutes => "60 minutes".to_string(),
            SlotWindow::Hours => "24 hours".to_string(),
            SlotWindow::Days(w) | SlotWindow::Months(w) => w.caption(),
            SlotWindow::NoPeriodData => "no period data".to_string(),
        }
    }
}

/// Resolve a display range against the aggregate snapshot.
pub fn select(range: DisplayRange, aggregate: &VolumeSnapshot) -> SlotWindow {
    let clock = Clock::of(aggregate);
    match (range, clock) {
        (DisplayRange::LastMinute, _) => SlotWindow::Seconds,
        (DisplayRange::LastHour, _) => SlotWindow::Minutes,
        (DisplayRange::LastDay, _) => SlotWindow::Hours,
        (DisplayRange::Month(_) | DisplayRange::Year(_), Clock::Untrusted) => {
            SlotWindow::NoPeriodData
        }
        (DisplayRange::Month(month), Clock::Trusted { first_day, today }) => {
            let month = month.unwrap_or_else(|| YearMonth::of(day_to_date(today)));
            SlotWindow::Days(PeriodWindow::new(Period::Month(month), first_day))
        }
        (DisplayRange::Year(year), Clock::Trusted { first_day, today }) => {
            let year = year.unwrap_or_else(|| YearMonth::of(day_to_date(today)).year());
            SlotWindow::Months(PeriodWindow::new(Period::Year(year), first_day))
        }
    }
}

/// Window of the month containing the aggregate's "today", if the clock is trusted.
pub fn current_month_window(aggregate: &VolumeSnapshot) -> Option<PeriodWindow> {
    match Clock::of(aggregate) {
        Clock::Trusted { first_day, today } => Some(PeriodWindow::new(
            Period::Month(YearMonth::of(day_to_date(today))),
            first_day,
        )),
        Clock::Untrusted => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodMenuItem {
    /// `YYYY-MM` or `YYYY`; accepted back as a period.
    pub id: String,
    pub caption: String,
}

/// Quick-pick periods: the last three months and the last two years, newest first,
/// never reaching before the month/year of the buffer's first day.
pub fn period_menu(aggregate: &VolumeSnapshot) -> Vec<PeriodMenuItem> {
    let Clock::Trusted { first_day, today } = Clock::of(aggregate) else {
        return Vec::new();
    };
    let first = YearMonth::of(day_to_date(first_day));
    let current = YearMonth::of(day_to_date(today));

    let mut items = Vec::with_capacity(MENU_MONTHS + MENU_YEARS);
    let mut month = current;
    for _ in 0..MENU_MONTHS {
        if month < first {
            break;
        }
        let period = Period::Month(month);
        items.push(PeriodMenuItem {
            id: period.to_string(),
            caption: period.caption(),
        });
        month = month.prev();
    }

    let mut year = current.year();
    for _ in 0..MENU_YEARS {
        if year < first.year() {
            break;
        }
        let period = Period::Year(year);
        items.push(PeriodMenuItem {
            id: period.to_string(),
            caption: period.caption(),
        });
        year -= 1;
    }
    items
}
