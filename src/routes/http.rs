// GET/POST handlers: version, chart, counters, periods, reset

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::IntoResponse,
};
use serde::Deserialize;

use super::{ApiError, AppState};
use crate::engine::{DisplayRange, Period, PeriodMenuItem, RangeName};
use crate::models::{ChartSeries, ServerScope, SummaryCounters};
use crate::view;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Deserialize)]
pub(super) struct ChartQuery {
    range: Option<RangeName>,
    #[serde(default)]
    server: usize,
    period: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ServerQuery {
    #[serde(default)]
    server: usize,
}

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/chart?range=&server=&period=
pub(super) async fn chart_handler(
    State(state): State<AppState>,
    query: Result<Query<ChartQuery>, QueryRejection>,
) -> Result<Json<ChartSeries>, ApiError> {
    let Query(q) = query?;
    let period = q
        .period
        .as_deref()
        .map(|p| Period::parse(p, &state.years))
        .transpose()?;
    let range = DisplayRange::from_parts(q.range, period)?;
    let series = view::get_chart_series(&state.pair(), range, ServerScope::from(q.server))?;
    Ok(Json(series))
}

/// GET /api/counters?server=
pub(super) async fn counters_handler(
    State(state): State<AppState>,
    query: Result<Query<ServerQuery>, QueryRejection>,
) -> Result<Json<SummaryCounters>, ApiError> {
    let Query(q) = query?;
    let counters =
        view::get_summary_counters(&state.pair(), ServerScope::from(q.server), &state.calendar)?;
    Ok(Json(counters))
}

/// GET /api/periods: quick-pick months and years.
pub(super) async fn periods_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<PeriodMenuItem>>, ApiError> {
    Ok(Json(view::period_menu(&state.pair())?))
}

/// POST /api/reset?server=: zero the custom counter, then refresh right away.
pub(super) async fn reset_handler(
    State(state): State<AppState>,
    query: Result<Query<ServerQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(q) = query?;
    let scope = ServerScope::from(q.server);
    state.provider.reset_custom_counter(scope).await?;
    state.refresh_now.notify_one();
    Ok(Json(serde_json::json!({ "reset": scope.index() })))
}
