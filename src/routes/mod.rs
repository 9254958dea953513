// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{
    Json, Router,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Local;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{Notify, watch};
use tower_http::cors::{Any, CorsLayer};

use crate::calendar::Calendar;
use crate::config::AppConfig;
use crate::engine::{PeriodError, YearWindow};
use crate::provider::{ProviderError, VolumeProvider};
use crate::view::{SnapshotPair, ViewError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) snapshots: watch::Receiver<SnapshotPair>,
    pub(crate) provider: Arc<dyn VolumeProvider>,
    pub(crate) refresh_now: Arc<Notify>,
    pub(crate) calendar: Calendar<Local>,
    pub(crate) years: YearWindow,
    pub(crate) ws_clients: Arc<AtomicUsize>,
}

impl AppState {
    /// Cheap copy of the latest pair; never holds the channel borrow across an await.
    pub(crate) fn pair(&self) -> SnapshotPair {
        self.snapshots.borrow().clone()
    }
}

pub fn app(
    snapshots: watch::Receiver<SnapshotPair>,
    provider: Arc<dyn VolumeProvider>,
    refresh_now: Arc<Notify>,
    ws_clients: Arc<AtomicUsize>,
    config: &AppConfig,
) -> Router {
    let state = AppState {
        snapshots,
        provider,
        refresh_now,
        calendar: Calendar::new(Local),
        years: config.period.year_window(),
        ws_clients,
    };
    Router::new()
        .route("/", get(|| async { "volstats: download volume statistics" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/chart", get(http::chart_handler)) // GET /api/chart
        .route("/api/counters", get(http::counters_handler)) // GET /api/counters
        .route("/api/periods", get(http::periods_handler)) // GET /api/periods
        .route("/api/reset", post(http::reset_handler)) // POST /api/reset
        .route("/ws/volumes", get(ws::ws_volumes)) // WS /ws/volumes
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

/// Handler error rendered as `{ "error": message }`.
#[derive(Debug)]
pub(crate) enum ApiError {
    BadRequest(String),
    View(ViewError),
    Provider(ProviderError),
}

impl From<PeriodError> for ApiError {
    fn from(e: PeriodError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl From<ViewError> for ApiError {
    fn from(e: ViewError) -> Self {
        ApiError::View(e)
    }
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        ApiError::Provider(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::View(e @ ViewError::NoSnapshot) => {
                (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
            }
            ApiError::View(e @ ViewError::UnknownServer(_)) => (StatusCode::NOT_FOUND, e.to_string()),
            ApiError::Provider(e @ ProviderError::UnknownServer(_)) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            ApiError::Provider(e) => {
                tracing::warn!(error = %e, operation = "reset_custom_counter", "provider call failed");
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
