use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{Notify, watch};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use volstats::provider::{JsonFileProvider, VolumeProvider};
use volstats::view::SnapshotPair;
use volstats::*;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let provider: Arc<dyn VolumeProvider> = Arc::new(JsonFileProvider::new(
        &app_config.provider.path,
        app_config.provider.aggregate,
    ));

    // First poll before serving so clients do not start on an empty view.
    let (snapshots_tx, snapshots_rx) = watch::channel(SnapshotPair::default());
    if let Err(e) = worker::refresh_once(provider.as_ref(), &snapshots_tx).await {
        tracing::warn!(
            error = %e,
            path = %app_config.provider.path,
            "initial refresh failed; serving without data until the next poll"
        );
    }

    let refresh_now = Arc::new(Notify::new());
    let ws_clients = Arc::new(AtomicUsize::new(0));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            provider: provider.clone(),
            snapshots: snapshots_tx,
            refresh_now: refresh_now.clone(),
            ws_clients: ws_clients.clone(),
            shutdown_rx,
        },
        worker::WorkerConfig {
            interval_ms: app_config.refresh.interval_ms,
            stats_log_interval_secs: app_config.refresh.stats_log_interval_secs,
        },
    );

    let app = routes::app(snapshots_rx, provider, refresh_now, ws_clients, &app_config);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(_) => {
                        let _ = tokio::signal::ctrl_c().await;
                        return;
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            #[cfg(not(unix))]
            {
                let _ = tokio::signal::ctrl_c().await;
            }
        } => {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
            let _ = worker_handle.await;
        }
    }

    Ok(())
}
