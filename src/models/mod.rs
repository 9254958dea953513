// Domain models: provider snapshots in, chart and counter payloads out

mod chart;
mod volume;

pub use chart::{
    ChartSeries, Counter, ResetStamp, SeriesStatus, SummaryCounters, Unit, VolumeFrame,
};
pub use volume::{
    BYTES_PER_MB, ServerScope, VolumeBatch, VolumeSize, VolumeSnapshot, slot_value,
};
