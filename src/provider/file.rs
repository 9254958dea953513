// JSON file provider: an array of per-server volume records, rewritten atomically on reset.

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::instrument;

use super::{ProviderError, VolumeProvider};
use crate::config::AggregateMode;
use crate::engine::merge_servers;
use crate::models::{ServerScope, VolumeBatch, VolumeSize, VolumeSnapshot};

pub struct JsonFileProvider {
    path: PathBuf,
    mode: AggregateMode,
    /// Serialises read-modify-write resets.
    write_lock: Mutex<()>,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>, mode: AggregateMode) -> Self {
        Self {
            path: path.into(),
            mode,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(skip(self), fields(provider = "json_file", operation = "read_records"))]
    async fn read_records(&self) -> Result<Vec<VolumeSnapshot>, ProviderError> {
        let raw = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }

    #[instrument(skip(self, records), fields(provider = "json_file", operation = "write_records", records_count = records.len()))]
    async fn write_records(&self, records: &[VolumeSnapshot]) -> Result<(), ProviderError> {
        let json = serde_json::to_vec_pretty(records)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    pub async fn fetch(&self) -> Result<VolumeBatch, ProviderError> {
        let records = self.read_records().await?;
        let servers = match self.mode {
            AggregateMode::Provided => records,
            AggregateMode::Merge => {
                let aggregate = merge_servers(&records).ok_or(ProviderError::Empty)?;
                std::iter::once(aggregate).chain(records).collect()
            }
        };
        VolumeBatch::new(servers).ok_or(ProviderError::Empty)
    }

    pub async fn reset(&self, scope: ServerScope) -> Result<(), ProviderError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_records().await?;
        let now = chrono::Utc::now().timestamp();

        match (scope.index(), self.mode) {
            (0, _) => records.iter_mut().for_each(|r| reset_record(r, now)),
            (n, AggregateMode::Provided) => {
                let record = records
                    .get_mut(n)
                    .ok_or(ProviderError::UnknownServer(n))?;
                let removed = record.custom();
                reset_record(record, now);
                // Keep the stored aggregate consistent with its servers.
                if let Some(aggregate) = records.first_mut() {
                    aggregate.set_custom(aggregate.custom().saturating_sub(removed));
                }
            }
            (n, AggregateMode::Merge) => {
                let record = records
                    .get_mut(n - 1)
                    .ok_or(ProviderError::UnknownServer(n))?;
                reset_record(record, now);
            }
        }

        self.write_records(&records).await?;
        tracing::info!(server = scope.index(), "custom counter reset");
        Ok(())
    }
}

fn reset_record(record: &mut VolumeSnapshot, now: i64) {
    record.set_custom(VolumeSize::ZERO);
    record.custom_time = now;
}

impl VolumeProvider for JsonFileProvider {
    fn fetch_volume_snapshots(&self) -> BoxFuture<'_, Result<VolumeBatch, ProviderError>> {
        self.fetch().boxed()
    }

    fn reset_custom_counter(&self, scope: ServerScope) -> BoxFuture<'_, Result<(), ProviderError>> {
        self.reset(scope).boxed()
    }
}
