// Aggregator: day-range sums, the headline totals, and the "All" merge of server buffers.

use super::selector::{Clock, PeriodWindow, current_month_window};
use crate::models::{ServerScope, VolumeBatch, VolumeSize, VolumeSnapshot};

/// Sum of the day buffer over aggregate indices `start..=end`, shifted by `slot_delta`.
/// Absent days count as zero.
pub fn sum_days(snapshot: &VolumeSnapshot, slot_delta: i64, start: i64, end: i64) -> VolumeSize {
    (start..=end)
        .filter_map(|i| snapshot.day_at(i + slot_delta))
        .sum()
}

/// Sum of a period window for one server; `None` when no day in it holds data.
pub fn sum_window(snapshot: &VolumeSnapshot, window: &PeriodWindow, slot_delta: i64) -> Option<VolumeSize> {
    let mut days = (window.start_index..=window.end_index)
        .filter_map(|i| snapshot.day_at(i + slot_delta))
        .peekable();
    days.peek()?;
    Some(days.sum())
}

/// Sum of plotted points; absent points are skipped.
pub fn sum_points(values: &[Option<VolumeSize>]) -> VolumeSize {
    values.iter().flatten().copied().sum()
}

/// Value at the server's own current day slot. `None` when that slot is negative or holds
/// no data.
pub fn today_total(snapshot: &VolumeSnapshot) -> Option<VolumeSize> {
    if snapshot.day_slot < 0 {
        return None;
    }
    snapshot.day_at(snapshot.day_slot)
}

/// Volume of the month containing the aggregate's "today" for `scope`.
/// `None` when the clock is untrusted or the scope does not exist.
pub fn month_to_date(batch: &VolumeBatch, scope: ServerScope) -> Option<VolumeSize> {
    let window = current_month_window(batch.aggregate())?;
    let snapshot = batch.server(scope)?;
    let delta = batch.slot_delta(scope)?;
    Some(sum_days(snapshot, delta, window.start_index, window.end_index))
}

fn is_trusted(snapshot: &VolumeSnapshot) -> bool {
    Clock::of(snapshot).is_trusted()
}

fn merge_slot(values: impl Iterator<Item = Option<VolumeSize>>) -> Option<VolumeSize> {
    values.fold(None, |acc, v| match (acc, v) {
        (None, None) => None,
        (acc, v) => Some(acc.unwrap_or_default() + v.unwrap_or_default()),
    })
}

fn merge_ring(servers: &[VolumeSnapshot], ring: impl Fn(&VolumeSnapshot) -> &[Option<VolumeSize>]) -> Vec<Option<VolumeSize>> {
    let len = servers.iter().map(|s| ring(s).len()).max().unwrap_or(0);
    (0..len)
        .map(|i| merge_slot(servers.iter().map(|s| ring(s).get(i).copied().flatten())))
        .collect()
}

/// Synthesize the "all servers" snapshot from real servers.
///
/// Day buffers are aligned by calendar day over the union of the servers' ranges. A slot
/// is absent only when every server lacks data for it; otherwise missing servers count as
/// zero. Servers with an untrusted clock are left out of the day alignment. Sub-day
/// rings share the wall clock and are merged index by index using the first server's
/// slot pointers. Running counters are summed and the reset time is the earliest
/// non-zero one.
pub fn merge_servers(servers: &[VolumeSnapshot]) -> Option<VolumeSnapshot> {
    let first = servers.first()?;
    let with_days: Vec<&VolumeSnapshot> = servers
        .iter()
        .filter(|s| !s.bytes_per_days.is_empty())
        .collect();
    // Untrusted day buffers cannot be placed on the calendar. They are only used when no
    // server is trusted, and then the merged clock stays untrusted.
    let with_days: Vec<&VolumeSnapshot> = if with_days.iter().any(|s| is_trusted(s)) {
        with_days.into_iter().filter(|s| is_trusted(s)).collect()
    } else {
        with_days
    };

    let (first_day, bytes_per_days) = match (
        with_days.iter().map(|s| s.first_day).min(),
        with_days.iter().map(|s| s.last_day()).max(),
    ) {
        (Some(start), Some(end)) => {
            let days = (start..=end)
                .map(|day| merge_slot(with_days.iter().map(|s| s.day_value(day))))
                .collect();
            (start, days)
        }
        _ => (first.first_day, Vec::new()),
    };

    // "today" is the newest calendar day any trusted server is writing.
    let today = servers
        .iter()
        .filter(|s| is_trusted(s))
        .map(|s| s.first_day + s.day_slot)
        .max();
    let day_slot = today.map_or(-1, |t| t - first_day);

    let total: VolumeSize = servers.iter().map(VolumeSnapshot::total).sum();
    let custom: VolumeSize = servers.iter().map(VolumeSnapshot::custom).sum();
    let custom_time = servers
        .iter()
        .map(|s| s.custom_time)
        .filter(|&t| t != 0)
        .min()
        .unwrap_or(0);

    Some(VolumeSnapshot {
        server_id: 0,
        first_day,
        day_slot,
        hour_slot: first.hour_slot,
        min_slot: first.min_slot,
        sec_slot: first.sec_slot,
        bytes_per_seconds: merge_ring(servers, |s| s.bytes_per_seconds.as_slice()),
        bytes_per_minutes: merge_ring(servers, |s| s.bytes_per_minutes.as_slice()),
        bytes_per_hours: merge_ring(servers, |s| s.bytes_per_hours.as_slice()),
        bytes_per_days,
        total_size_mb: total.mb,
        total_size_lo: total.lo,
        custom_size_mb: custom.mb,
        custom_size_lo: custom.lo,
        custom_time,
    })
}
