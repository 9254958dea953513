// Chart and counter payloads handed to the presentation layer (camelCase JSON).

use serde::{Deserialize, Serialize};

use super::VolumeSize;

/// Display unit of a chart's value axis, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "B")]
    Byte,
    #[serde(rename = "KB")]
    Kilobyte,
    #[serde(rename = "MB")]
    Megabyte,
    #[serde(rename = "GB")]
    Gigabyte,
    #[serde(rename = "TB")]
    Terabyte,
}

impl Unit {
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Byte => "B",
            Unit::Kilobyte => "KB",
            Unit::Megabyte => "MB",
            Unit::Gigabyte => "GB",
            Unit::Terabyte => "TB",
        }
    }
}

/// A textual counter with the exact size behind it; `raw` is `None` for "no data".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counter {
    pub display: String,
    pub raw: Option<VolumeSize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetStamp {
    pub display: String,
    /// Unix seconds; 0 when the counter was never reset.
    pub raw: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCounters {
    pub today: Counter,
    pub month_to_date: Counter,
    pub all_time: Counter,
    pub since_reset: Counter,
    pub reset_timestamp: ResetStamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesStatus {
    Ready,
    /// Month/year view requested while the provider clock is untrusted.
    NoPeriodData,
}

/// Parallel per-point sequences for a line chart plus the point marked as "now".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub status: SeriesStatus,
    pub caption: String,
    pub unit: Unit,
    pub values: Vec<Option<f64>>,
    pub raw_values: Vec<Option<VolumeSize>>,
    pub axis_labels: Vec<String>,
    pub hover_labels: Vec<String>,
    pub current_index: Option<usize>,
    /// Sum of every plotted point.
    pub total: Counter,
}

/// What a live client receives after each refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeFrame {
    pub chart: ChartSeries,
    pub counters: SummaryCounters,
}
