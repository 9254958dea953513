// Background refresh worker: polls the provider and publishes the snapshot pair.
// A failed poll keeps the last good pair; viewers keep showing it until the next success.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Notify, oneshot, watch};
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::Instrument;

use crate::engine::Clock;
use crate::provider::VolumeProvider;
use crate::view::SnapshotPair;

/// Provider, channels, and shutdown for the worker.
pub struct WorkerDeps {
    pub provider: Arc<dyn VolumeProvider>,
    pub snapshots: watch::Sender<SnapshotPair>,
    /// Wakes the worker for an immediate poll (e.g. after a counter reset).
    pub refresh_now: Arc<Notify>,
    pub ws_clients: Arc<AtomicUsize>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

/// Worker timing and logging config.
pub struct WorkerConfig {
    pub interval_ms: u64,
    /// How often to log refresh stats (real seconds).
    pub stats_log_interval_secs: u64,
}

/// Poll the provider once and, on success, shift the new batch into the pair.
pub async fn refresh_once(
    provider: &dyn VolumeProvider,
    snapshots: &watch::Sender<SnapshotPair>,
) -> anyhow::Result<()> {
    let batch = provider.fetch_volume_snapshots().await?;
    if !Clock::of(batch.aggregate()).is_trusted() {
        tracing::debug!(
            first_day = batch.aggregate().first_day,
            day_slot = batch.aggregate().day_slot,
            "provider clock untrusted; period views disabled"
        );
    }
    // send_modify publishes even when nobody is subscribed.
    snapshots.send_modify(|pair| pair.advance(batch));
    Ok(())
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        provider,
        snapshots,
        refresh_now,
        ws_clients,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        interval_ms,
        stats_log_interval_secs,
    } = config;

    let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", interval_ms);
    tokio::spawn(
        async move {
            let mut tick = interval(Duration::from_millis(interval_ms));
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
            stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

            let mut refresh_ok_total: u64 = 0;
            let mut refresh_failed_total: u64 = 0;

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Worker shutting down");
                        break;
                    }
                    _ = tick.tick() => {}
                    _ = refresh_now.notified() => {
                        tracing::debug!("on-demand refresh");
                        tick.reset();
                    }
                    _ = stats_log_tick.tick() => {
                        tracing::info!(
                            ws_clients = ws_clients.load(Ordering::Relaxed),
                            refresh_ok_total,
                            refresh_failed_total,
                            "refresh stats"
                        );
                        continue;
                    }
                }

                match refresh_once(provider.as_ref(), &snapshots).await {
                    Ok(()) => refresh_ok_total += 1,
                    Err(e) => {
                        refresh_failed_total += 1;
                        tracing::warn!(
                            error = %e,
                            operation = "fetch_volume_snapshots",
                            "refresh failed; keeping last snapshot"
                        );
                    }
                }
            }
        }
        .instrument(worker_span),
    )
}
