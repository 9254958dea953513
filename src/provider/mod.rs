// Volume provider seam: where snapshot batches come from and where resets go.

mod file;

pub use file::JsonFileProvider;

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::models::{ServerScope, VolumeBatch};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("volume source I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("volume source is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("volume source lists no servers")]
    Empty,
    #[error("unknown server {0}")]
    UnknownServer(usize),
}

/// Supplies immutable snapshot batches and applies custom-counter resets.
///
/// Entry 0 of every batch is the "all servers" aggregate.
pub trait VolumeProvider: Send + Sync + 'static {
    fn fetch_volume_snapshots(&self) -> BoxFuture<'_, Result<VolumeBatch, ProviderError>>;

    /// Zero the custom counter of `scope` (every server for `All`) and stamp the reset time.
    fn reset_custom_counter(&self, scope: ServerScope) -> BoxFuture<'_, Result<(), ProviderError>>;
}
