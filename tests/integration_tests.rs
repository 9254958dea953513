// Integration tests: HTTP and WebSocket endpoints

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::{StaticProvider, day, mb, snapshot};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{Notify, watch};
use volstats::config::AppConfig;
use volstats::models::{ChartSeries, SummaryCounters, VolumeBatch, VolumeFrame};
use volstats::routes;
use volstats::view::SnapshotPair;

const TEST_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[provider]
path = "data/test.json"

[refresh]
interval_ms = 1000
stats_log_interval_secs = 60
"#;

struct TestApp {
    router: axum::Router,
    snapshots: watch::Sender<SnapshotPair>,
    provider: Arc<StaticProvider>,
    refresh_now: Arc<Notify>,
}

fn servers() -> Vec<volstats::models::VolumeSnapshot> {
    let first = day(2020, 1, 1);
    let mut aggregate = snapshot(first, 40, vec![mb(3); 41]);
    aggregate.total_size_mb = 123;
    aggregate.custom_size_mb = 5;
    let server = snapshot(first + 20, 20, vec![mb(1); 21]);
    vec![aggregate, server]
}

fn test_app(loaded: bool) -> TestApp {
    let config = AppConfig::load_from_str(TEST_CONFIG).unwrap();
    let pair = if loaded {
        SnapshotPair::new(VolumeBatch::new(servers()).unwrap())
    } else {
        SnapshotPair::default()
    };
    let (snapshots, rx) = watch::channel(pair);
    let provider = Arc::new(StaticProvider::new(servers()));
    let refresh_now = Arc::new(Notify::new());
    let router = routes::app(
        rx,
        provider.clone(),
        refresh_now.clone(),
        Arc::new(AtomicUsize::new(0)),
        &config,
    );
    TestApp {
        router,
        snapshots,
        provider,
        refresh_now,
    }
}

#[tokio::test]
async fn test_root_endpoint() {
    let server = TestServer::try_new(test_app(true).router).unwrap();
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("volstats: download volume statistics");
}

#[tokio::test]
async fn test_version_endpoint() {
    let server = TestServer::try_new(test_app(true).router).unwrap();
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("volstats"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_chart_endpoint_month() {
    let server = TestServer::try_new(test_app(true).router).unwrap();
    let response = server.get("/api/chart?range=month").await;
    response.assert_status_ok();
    let chart: ChartSeries = response.json();
    assert_eq!(chart.caption, "February 2020");
    assert_eq!(chart.values.len(), 31);
    assert_eq!(chart.current_index, Some(9));
}

#[tokio::test]
async fn test_chart_endpoint_with_period_and_server() {
    let server = TestServer::try_new(test_app(true).router).unwrap();
    let response = server.get("/api/chart?period=2020-01&server=1").await;
    response.assert_status_ok();
    let chart: ChartSeries = response.json();
    assert_eq!(chart.caption, "January 2020");
    assert_eq!(chart.raw_values[19], None);
    assert_eq!(chart.raw_values[20], mb(1));

    let json: serde_json::Value = server.get("/api/chart?range=year").await.json();
    assert_eq!(json["caption"], "2020");
    assert_eq!(json["unit"], "MB");
    assert_eq!(json["values"].as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn test_chart_endpoint_rejects_bad_input() {
    let server = TestServer::try_new(test_app(true).router).unwrap();

    let response = server.get("/api/chart?period=1999").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let json: serde_json::Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("1999"));

    server
        .get("/api/chart?range=month&period=2020-13")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/api/chart?range=fortnight")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/api/chart?server=9")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_endpoints_before_first_snapshot() {
    let server = TestServer::try_new(test_app(false).router).unwrap();
    let response = server.get("/api/counters").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json: serde_json::Value = response.json();
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_counters_endpoint() {
    let server = TestServer::try_new(test_app(true).router).unwrap();
    let counters: SummaryCounters = server.get("/api/counters").await.json();
    assert_eq!(counters.today.raw, mb(3));
    assert_eq!(counters.month_to_date.raw, mb(30));
    assert_eq!(counters.all_time.display, "123 MB");
    assert_eq!(counters.reset_timestamp.display, "never");

    let json: serde_json::Value = server.get("/api/counters?server=1").await.json();
    assert_eq!(json["today"]["raw"]["SizeMB"], 1);
    assert_eq!(json["monthToDate"]["raw"]["SizeMB"], 10);
}

#[tokio::test]
async fn test_periods_endpoint() {
    let server = TestServer::try_new(test_app(true).router).unwrap();
    let json: serde_json::Value = server.get("/api/periods").await.json();
    let ids: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["2020-02", "2020-01", "2020"]);
}

#[tokio::test]
async fn test_reset_endpoint_calls_provider_and_requests_refresh() {
    let app = test_app(true);
    let provider = app.provider.clone();
    let refresh_now = app.refresh_now.clone();
    let server = TestServer::try_new(app.router).unwrap();

    server.post("/api/reset?server=1").await.assert_status_ok();
    assert_eq!(
        provider.resets.lock().unwrap().as_slice(),
        [volstats::models::ServerScope::Server(1)]
    );
    tokio::time::timeout(tokio::time::Duration::from_secs(1), refresh_now.notified())
        .await
        .expect("reset should request a refresh");

    server
        .post("/api/reset?server=9")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// --- WebSocket message tests (require http_transport + ws feature) ---
// Receive until we get valid JSON (server may send Ping first).

async fn receive_first_json_text<T: serde::de::DeserializeOwned>(
    ws: &mut axum_test::TestWebSocket,
) -> T {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(3);
    loop {
        let text = ws.receive_text().await;
        if let Ok(v) = serde_json::from_str::<T>(&text) {
            return v;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for JSON"
        );
    }
}

#[tokio::test]
async fn test_ws_sends_frame_on_connect_and_after_commands() {
    let app = test_app(true);
    let server = TestServer::builder().http_transport().try_build(app.router).unwrap();
    let mut ws = server.get_websocket("/ws/volumes").await.into_websocket().await;

    let frame: VolumeFrame = receive_first_json_text(&mut ws).await;
    assert_eq!(frame.chart.caption, "60 seconds");
    assert_eq!(frame.counters.today.raw, mb(3));

    ws.send_text(r#"{"type":"range","range":"month"}"#).await;
    let frame: VolumeFrame = receive_first_json_text(&mut ws).await;
    assert_eq!(frame.chart.caption, "February 2020");

    ws.send_text(r#"{"type":"period","period":"2020"}"#).await;
    let frame: VolumeFrame = receive_first_json_text(&mut ws).await;
    assert_eq!(frame.chart.caption, "2020");

    ws.send_text(r#"{"type":"server","server":1}"#).await;
    let frame: VolumeFrame = receive_first_json_text(&mut ws).await;
    assert_eq!(frame.counters.today.raw, mb(1));
}

#[tokio::test]
async fn test_ws_range_switch_keeps_chosen_month() {
    let app = test_app(true);
    let server = TestServer::builder().http_transport().try_build(app.router).unwrap();
    let mut ws = server.get_websocket("/ws/volumes").await.into_websocket().await;
    let _: VolumeFrame = receive_first_json_text(&mut ws).await;

    ws.send_text(r#"{"type":"period","period":"2020-01"}"#).await;
    let frame: VolumeFrame = receive_first_json_text(&mut ws).await;
    assert_eq!(frame.chart.caption, "January 2020");

    ws.send_text(r#"{"type":"range","range":"hour"}"#).await;
    let frame: VolumeFrame = receive_first_json_text(&mut ws).await;
    assert_eq!(frame.chart.caption, "60 minutes");

    ws.send_text(r#"{"type":"range","range":"month"}"#).await;
    let frame: VolumeFrame = receive_first_json_text(&mut ws).await;
    assert_eq!(frame.chart.caption, "January 2020");
}

#[tokio::test]
async fn test_ws_reports_invalid_commands() {
    let app = test_app(true);
    let server = TestServer::builder().http_transport().try_build(app.router).unwrap();
    let mut ws = server.get_websocket("/ws/volumes").await.into_websocket().await;
    let _: VolumeFrame = receive_first_json_text(&mut ws).await;

    ws.send_text(r#"{"type":"period","period":"1999"}"#).await;
    let json: serde_json::Value = receive_first_json_text(&mut ws).await;
    assert_eq!(json["type"], "error");
    assert!(json["error"].as_str().unwrap().contains("1999"));
}

#[tokio::test]
async fn test_ws_lock_defers_refresh_until_unlock() {
    let app = test_app(true);
    let snapshots = app.snapshots;
    let server = TestServer::builder().http_transport().try_build(app.router).unwrap();
    let mut ws = server.get_websocket("/ws/volumes").await.into_websocket().await;
    let _: VolumeFrame = receive_first_json_text(&mut ws).await;

    ws.send_text(r#"{"type":"lock"}"#).await;
    ws.send_text(r#"{"type":"range","range":"day"}"#).await;
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    for total in [200, 300] {
        let mut next = servers();
        next[0].total_size_mb = total;
        snapshots.send_modify(|pair| pair.advance(VolumeBatch::new(next).unwrap()));
    }
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    ws.send_text(r#"{"type":"unlock"}"#).await;

    // One coalesced redraw with the latest snapshot and the range chosen while locked.
    let frame: VolumeFrame = receive_first_json_text(&mut ws).await;
    assert_eq!(frame.chart.caption, "24 hours");
    assert_eq!(frame.counters.all_time.display, "300 MB");
}
