// Presentation adapter: assembles engine output into chart series and summary counters.
// Holds no business rule of its own; every call recomputes from the snapshot pair.

mod redraw;
mod state;

pub use redraw::RedrawGate;
pub use state::StatisticsViewState;

use chrono::TimeZone;
use std::sync::Arc;
use thiserror::Error;

use crate::calendar::Calendar;
use crate::engine::{
    self, DisplayRange, PeriodMenuItem, RingSeries, SlotWindow, choose_unit, counter, ring,
    scale_series, sum_points, sum_window,
};
use crate::models::{
    ChartSeries, ResetStamp, SeriesStatus, ServerScope, SummaryCounters, VolumeBatch,
    VolumeSnapshot,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("no volume snapshot has been loaded yet")]
    NoSnapshot,
    #[error("unknown server {0}")]
    UnknownServer(usize),
}

/// The latest batch and the one before it. Replaced as a whole on every refresh.
#[derive(Debug, Clone, Default)]
pub struct SnapshotPair {
    pub current: Option<Arc<VolumeBatch>>,
    pub previous: Option<Arc<VolumeBatch>>,
}

impl SnapshotPair {
    pub fn new(batch: VolumeBatch) -> Self {
        Self {
            current: Some(Arc::new(batch)),
            previous: None,
        }
    }

    /// Shift `current` into `previous` and install `batch`.
    pub fn advance(&mut self, batch: VolumeBatch) {
        self.previous = self.current.replace(Arc::new(batch));
    }

    fn batch(&self) -> Result<&VolumeBatch, ViewError> {
        self.current.as_deref().ok_or(ViewError::NoSnapshot)
    }

    fn server(&self, scope: ServerScope) -> Result<(&VolumeBatch, &VolumeSnapshot), ViewError> {
        let batch = self.batch()?;
        let snapshot = batch
            .server(scope)
            .ok_or(ViewError::UnknownServer(scope.index()))?;
        Ok((batch, snapshot))
    }
}

/// Build the chart for `range` and `scope` from the current pair.
pub fn get_chart_series(
    pair: &SnapshotPair,
    range: DisplayRange,
    scope: ServerScope,
) -> Result<ChartSeries, ViewError> {
    let (batch, snapshot) = pair.server(scope)?;
    let slot_delta = batch.slot_delta(scope).unwrap_or(0);
    let window = engine::select(range, batch.aggregate());

    let series = match window {
        SlotWindow::Seconds => {
            let previous = pair.previous.as_deref().and_then(|p| p.server(scope));
            ring::read_seconds(snapshot, previous)
        }
        SlotWindow::Minutes => ring::read_minutes(snapshot),
        SlotWindow::Hours => ring::read_hours(snapshot),
        SlotWindow::Days(w) => ring::read_days(snapshot, &w, slot_delta),
        SlotWindow::Months(w) => ring::read_months(snapshot, &w, slot_delta),
        SlotWindow::NoPeriodData => RingSeries::default(),
    };

    // A period with no recorded day reads "no data"; ring ranges always have a total.
    let (status, total) = match window {
        SlotWindow::NoPeriodData => (SeriesStatus::NoPeriodData, counter(None)),
        SlotWindow::Days(w) | SlotWindow::Months(w) => (
            SeriesStatus::Ready,
            counter(sum_window(snapshot, &w, slot_delta)),
        ),
        _ => (SeriesStatus::Ready, counter(Some(sum_points(&series.values)))),
    };
    let unit = choose_unit(&series.values);

    Ok(ChartSeries {
        status,
        caption: window.caption(),
        unit,
        values: scale_series(&series.values, unit),
        raw_values: series.values,
        axis_labels: series.axis_labels,
        hover_labels: series.hover_labels,
        current_index: series.current,
        total,
    })
}

/// Headline counters for `scope`. The reset time is rendered in `calendar`'s zone.
pub fn get_summary_counters<Tz>(
    pair: &SnapshotPair,
    scope: ServerScope,
    calendar: &Calendar<Tz>,
) -> Result<SummaryCounters, ViewError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let (batch, snapshot) = pair.server(scope)?;
    Ok(SummaryCounters {
        today: counter(engine::today_total(snapshot)),
        month_to_date: counter(engine::month_to_date(batch, scope)),
        all_time: counter(Some(snapshot.total())),
        since_reset: counter(Some(snapshot.custom())),
        reset_timestamp: ResetStamp {
            display: calendar.format_timestamp(snapshot.custom_time),
            raw: snapshot.custom_time,
        },
    })
}

/// Quick-pick months and years; empty while the clock is untrusted.
pub fn period_menu(pair: &SnapshotPair) -> Result<Vec<PeriodMenuItem>, ViewError> {
    Ok(engine::period_menu(pair.batch()?.aggregate()))
}
