// Ring reader: turns one server's ring buffers into a fixed-length chart series.
// Missing slots stay absent; nothing here coerces absent to zero.

use chrono::Datelike;

use super::period::MONTH_NAMES;
use super::selector::{HOUR_SLOTS, MINUTE_SLOTS, MONTH_POINTS, PeriodWindow, SECOND_SLOTS, YEAR_POINTS};
use crate::models::{VolumeSize, VolumeSnapshot, slot_value};

/// Parallel per-point sequences plus the index of the point being written right now.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RingSeries {
    pub values: Vec<Option<VolumeSize>>,
    pub axis_labels: Vec<String>,
    pub hover_labels: Vec<String>,
    pub current: Option<usize>,
}

impl RingSeries {
    fn with_capacity(n: usize) -> Self {
        Self {
            values: Vec::with_capacity(n),
            axis_labels: Vec::with_capacity(n),
            hover_labels: Vec::with_capacity(n),
            current: None,
        }
    }

    fn push(&mut self, value: Option<VolumeSize>, hover: String, axis: String) {
        self.values.push(value);
        self.hover_labels.push(hover);
        self.axis_labels.push(axis);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn tick(show: bool, label: impl ToString) -> String {
    if show { label.to_string() } else { String::new() }
}

fn ring_pointer(slot: i64, len: usize) -> Option<usize> {
    usize::try_from(slot).ok().filter(|&i| i < len)
}

fn read_fixed(values: &[Option<VolumeSize>], len: usize, suffix: &str, every: usize) -> RingSeries {
    let mut series = RingSeries::with_capacity(len);
    for i in 0..len {
        series.push(
            slot_value(values, i as i64),
            format!("{i}{suffix}"),
            tick(i % every == 0 || i == len - 1, i),
        );
    }
    series
}

/// Last 60 seconds. The in-progress second is under-filled, so when the previous reading
/// is available its value for that slot is shown instead and "now" moves back one slot.
pub fn read_seconds(current: &VolumeSnapshot, previous: Option<&VolumeSnapshot>) -> RingSeries {
    let mut series = read_fixed(&current.bytes_per_seconds, SECOND_SLOTS, "s", 10);
    let pointer = ring_pointer(current.sec_slot, SECOND_SLOTS);
    series.current = match (pointer, previous) {
        (Some(p), Some(prev)) => {
            series.values[p] = slot_value(&prev.bytes_per_seconds, p as i64);
            Some(if p > 0 { p - 1 } else { SECOND_SLOTS - 1 })
        }
        (p, _) => p,
    };
    series
}

/// Last 60 minutes; the current minute is shown as-is.
pub fn read_minutes(snapshot: &VolumeSnapshot) -> RingSeries {
    let mut series = read_fixed(&snapshot.bytes_per_minutes, MINUTE_SLOTS, "m", 10);
    series.current = ring_pointer(snapshot.min_slot, MINUTE_SLOTS);
    series
}

/// Last 24 hours; the current hour is shown as-is.
pub fn read_hours(snapshot: &VolumeSnapshot) -> RingSeries {
    let mut series = read_fixed(&snapshot.bytes_per_hours, HOUR_SLOTS, "h", 3);
    series.current = ring_pointer(snapshot.hour_slot, HOUR_SLOTS);
    series
}

/// One point per day of the window's month, padded with absent points to 31.
/// `slot_delta` maps aggregate day indices onto this server's buffer.
pub fn read_days(snapshot: &VolumeSnapshot, window: &PeriodWindow, slot_delta: i64) -> RingSeries {
    let mut series = RingSeries::with_capacity(MONTH_POINTS);
    let mut date = window.first_date;
    for (n, i) in (window.start_index..=window.end_index).enumerate() {
        let day = n + 1;
        let slot = i + slot_delta;
        let last = i == window.end_index;
        series.push(
            snapshot.day_at(slot),
            date.format("%a %b %d %Y").to_string(),
            tick(day == 1 || day % 5 == 0 || (day < 30 && last), day),
        );
        if slot == snapshot.day_slot {
            series.current = Some(day - 1);
        }
        date = date.succ_opt().unwrap_or(date);
    }
    while series.len() < MONTH_POINTS {
        series.push(None, String::new(), String::new());
    }
    series
}

/// One point per month of the window's year, folded from the day buffer.
///
/// Megabytes and low bytes are folded separately. Months before the first or after the
/// last month holding any data are absent; months in between are reported even if zero.
pub fn read_months(snapshot: &VolumeSnapshot, window: &PeriodWindow, slot_delta: i64) -> RingSeries {
    let mut buckets = [VolumeSize::ZERO; YEAR_POINTS];
    let mut first_month: Option<usize> = None;
    let mut last_month: Option<usize> = None;
    let mut current = None;

    let mut date = window.first_date;
    for i in window.start_index..=window.end_index {
        let slot = i + slot_delta;
        if let Some(bytes) = snapshot.day_at(slot) {
            let month = date.month0() as usize;
            buckets[month] += bytes;
            first_month.get_or_insert(month);
            last_month = Some(last_month.map_or(month, |m| m.max(month)));
            if slot == snapshot.day_slot {
                current = Some(month);
            }
        }
        date = date.succ_opt().unwrap_or(date);
    }

    let year = window.first_date.year();
    let mut series = RingSeries::with_capacity(YEAR_POINTS);
    for (month, bucket) in buckets.iter().enumerate() {
        let has_data = matches!(
            (first_month, last_month),
            (Some(first), Some(last)) if (first..=last).contains(&month)
        );
        series.push(
            has_data.then_some(*bucket),
            format!("{} {}", MONTH_NAMES[month], year),
            MONTH_NAMES[month][..3].to_string(),
        );
    }
    series.current = current;
    series
}
