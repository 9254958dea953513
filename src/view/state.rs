// Per-viewer selection: range, server, period, and the redraw gate.

use chrono::TimeZone;
use std::fmt;

use super::{RedrawGate, SnapshotPair, ViewError, get_chart_series, get_summary_counters};
use crate::calendar::Calendar;
use crate::engine::{DisplayRange, Period, PeriodError, YearWindow};
use crate::models::{ServerScope, VolumeFrame};

/// What one viewer is looking at. Selection survives snapshot refreshes; everything
/// derived from it is recomputed on each render.
///
/// The `choose_*` methods and `request_redraw` return whether a redraw should happen now.
#[derive(Debug, Clone, Default)]
pub struct StatisticsViewState {
    range: DisplayRange,
    /// Last month or year pinned by the viewer; a bare month/year range reopens it.
    period: Option<Period>,
    scope: ServerScope,
    years: YearWindow,
    gate: RedrawGate,
}

impl StatisticsViewState {
    pub fn new(years: YearWindow) -> Self {
        Self {
            years,
            ..Self::default()
        }
    }

    pub fn range(&self) -> DisplayRange {
        self.range
    }

    pub fn scope(&self) -> ServerScope {
        self.scope
    }

    pub fn gate(&self) -> &RedrawGate {
        &self.gate
    }

    pub fn period(&self) -> Option<Period> {
        self.period
    }

    /// Switch range. `Month(None)`/`Year(None)` resolve to the pinned period of the same
    /// kind, if any; an explicit month or year becomes the new pinned period.
    pub fn choose_range(&mut self, range: DisplayRange) -> bool {
        self.range = match (range, self.period) {
            (DisplayRange::Month(None), Some(Period::Month(m))) => DisplayRange::Month(Some(m)),
            (DisplayRange::Year(None), Some(Period::Year(y))) => DisplayRange::Year(Some(y)),
            (DisplayRange::Month(Some(m)), _) => {
                self.period = Some(Period::Month(m));
                range
            }
            (DisplayRange::Year(Some(y)), _) => {
                self.period = Some(Period::Year(y));
                range
            }
            _ => range,
        };
        self.request_redraw()
    }

    /// Select a server; it must exist in the current batch.
    pub fn choose_server(&mut self, pair: &SnapshotPair, scope: ServerScope) -> Result<bool, ViewError> {
        let batch = pair.current.as_deref().ok_or(ViewError::NoSnapshot)?;
        if batch.server(scope).is_none() {
            return Err(ViewError::UnknownServer(scope.index()));
        }
        self.scope = scope;
        Ok(self.request_redraw())
    }

    /// Pin the chart to a manually entered `YYYY` or `YYYY-MM`. Invalid input leaves the
    /// selection untouched.
    pub fn choose_period(&mut self, input: &str) -> Result<bool, PeriodError> {
        let period = Period::parse(input, &self.years)?;
        Ok(self.choose_range(period.into()))
    }

    pub fn request_redraw(&mut self) -> bool {
        self.gate.request()
    }

    pub fn lock(&mut self) {
        self.gate.lock();
    }

    /// Release one hold; true when a redraw was deferred and should run now.
    pub fn unlock(&mut self) -> bool {
        self.gate.unlock()
    }

    pub fn render<Tz>(&self, pair: &SnapshotPair, calendar: &Calendar<Tz>) -> Result<VolumeFrame, ViewError>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Ok(VolumeFrame {
            chart: get_chart_series(pair, self.range, self.scope)?,
            counters: get_summary_counters(pair, self.scope, calendar)?,
        })
    }
}
