// Display ranges and the calendar periods (month or year) a chart can be pinned to.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Rejected manual period input. Nothing is computed for a rejected period.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("period must be YYYY or YYYY-MM, got {0:?}")]
    Malformed(String),
    #[error("year {year} is outside the valid window {min}..={max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },
    #[error("month {0} is outside 1..=12")]
    MonthOutOfRange(u32),
    #[error("period {period} does not fit range {range}")]
    RangeMismatch { range: &'static str, period: Period },
}

/// Years accepted for manual period entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct YearWindow {
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for YearWindow {
    fn default() -> Self {
        Self {
            min_year: 2013,
            max_year: 2050,
        }
    }
}

impl YearWindow {
    fn check(&self, year: i32) -> Result<i32, PeriodError> {
        if (self.min_year..=self.max_year).contains(&year) {
            Ok(year)
        } else {
            Err(PeriodError::YearOutOfRange {
                year,
                min: self.min_year,
                max: self.max_year,
            })
        }
    }
}

/// A calendar month; `month` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_date(&self) -> NaiveDate {
        self.next()
            .first_date()
            .pred_opt()
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A month or a whole year selected for the period chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Month(YearMonth),
    Year(i32),
}

impl Period {
    /// Parse `YYYY` or `YYYY-MM`, rejecting years outside `window`.
    pub fn parse(input: &str, window: &YearWindow) -> Result<Self, PeriodError> {
        let input = input.trim();
        let malformed = || PeriodError::Malformed(input.to_string());
        let number = |s: &str, max_len: usize| -> Result<u32, PeriodError> {
            if s.is_empty() || s.len() > max_len || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            s.parse::<u32>().map_err(|_| malformed())
        };

        match input.split_once('-') {
            None => {
                let year = number(input, 4)? as i32;
                Ok(Period::Year(window.check(year)?))
            }
            Some((year, month)) => {
                let year = window.check(number(year, 4)? as i32)?;
                let month = number(month, 2)?;
                YearMonth::new(year, month)
                    .map(Period::Month)
                    .ok_or(PeriodError::MonthOutOfRange(month))
            }
        }
    }

    pub fn first_date(&self) -> NaiveDate {
        match self {
            Period::Month(m) => m.first_date(),
            Period::Year(y) => NaiveDate::from_ymd_opt(*y, 1, 1).unwrap_or(NaiveDate::MIN),
        }
    }

    pub fn last_date(&self) -> NaiveDate {
        match self {
            Period::Month(m) => m.last_date(),
            Period::Year(y) => NaiveDate::from_ymd_opt(*y, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }

    /// Menu/title text: "February 2020" or "2020".
    pub fn caption(&self) -> String {
        match self {
            Period::Month(m) => format!("{} {}", m.name(), m.year()),
            Period::Year(y) => y.to_string(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Month(m) => write!(f, "{m}"),
            Period::Year(y) => write!(f, "{:04}", y),
        }
    }
}

/// Range names accepted from clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeName {
    #[serde(alias = "min")]
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

/// What the chart shows. Month/year carry the selected period; `None` means the one
/// containing the provider's "today".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DisplayRange {
    #[default]
    LastMinute,
    LastHour,
    LastDay,
    Month(Option<YearMonth>),
    Year(Option<i32>),
}

impl DisplayRange {
    pub fn name(&self) -> &'static str {
        match self {
            DisplayRange::LastMinute => "minute",
            DisplayRange::LastHour => "hour",
            DisplayRange::LastDay => "day",
            DisplayRange::Month(_) => "month",
            DisplayRange::Year(_) => "year",
        }
    }

    /// Combine a client-supplied range name and optional period. A period alone selects
    /// its own range; fixed ranges ignore the period.
    pub fn from_parts(name: Option<RangeName>, period: Option<Period>) -> Result<Self, PeriodError> {
        let range = match (name, period) {
            (None, None) | (Some(RangeName::Minute), _) => DisplayRange::LastMinute,
            (None, Some(p)) => p.into(),
            (Some(RangeName::Hour), _) => DisplayRange::LastHour,
            (Some(RangeName::Day), _) => DisplayRange::LastDay,
            (Some(RangeName::Month), None) => DisplayRange::Month(None),
            (Some(RangeName::Month), Some(Period::Month(m))) => DisplayRange::Month(Some(m)),
            (Some(RangeName::Year), None) => DisplayRange::Year(None),
            (Some(RangeName::Year), Some(Period::Year(y))) => DisplayRange::Year(Some(y)),
            (Some(name @ (RangeName::Month | RangeName::Year)), Some(period)) => {
                return Err(PeriodError::RangeMismatch {
                    range: if name == RangeName::Month { "month" } else { "year" },
                    period,
                });
            }
        };
        Ok(range)
    }
}

impl From<Period> for DisplayRange {
    fn from(period: Period) -> Self {
        match period {
            Period::Month(m) => DisplayRange::Month(Some(m)),
            Period::Year(y) => DisplayRange::Year(Some(y)),
        }
    }
}
