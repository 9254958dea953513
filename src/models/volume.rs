// Per-server volume snapshots as delivered by the provider (PascalCase wire names).

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Below this many megabytes the low byte part is exact and is preferred over `mb`.
const EXACT_LO_LIMIT_MB: u64 = 2000;

/// Transfer volume as whole megabytes plus the low 32 bits of the exact byte count.
///
/// The two halves are summed independently so large totals never go through floating
/// point. `lo` is exact while the volume stays below 4 GiB. Ordering compares `mb` first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VolumeSize {
    #[serde(rename = "SizeMB")]
    pub mb: u64,
    #[serde(rename = "SizeLo")]
    pub lo: u32,
}

impl VolumeSize {
    pub const ZERO: VolumeSize = VolumeSize { mb: 0, lo: 0 };

    pub fn new(mb: u64, lo: u32) -> Self {
        Self { mb, lo }
    }

    pub fn from_bytes(bytes: u64) -> Self {
        Self {
            mb: bytes / BYTES_PER_MB,
            lo: bytes as u32,
        }
    }

    pub fn from_mb(mb: u64) -> Self {
        Self::from_bytes(mb * BYTES_PER_MB)
    }

    pub fn is_zero(&self) -> bool {
        self.mb == 0 && self.lo == 0
    }

    /// Size in megabytes, using the exact byte part while it is trustworthy.
    pub fn megabytes(&self) -> f64 {
        if self.mb < EXACT_LO_LIMIT_MB {
            self.lo as f64 / BYTES_PER_MB as f64
        } else {
            self.mb as f64
        }
    }

    /// Remove `other` from this size (used when one server's counter is reset out of a sum).
    /// Clamps to zero when `other` is the larger size.
    pub fn saturating_sub(self, other: VolumeSize) -> Self {
        if other >= self {
            return Self::ZERO;
        }
        Self {
            mb: self.mb - other.mb,
            lo: self.lo.wrapping_sub(other.lo),
        }
    }
}

impl Add for VolumeSize {
    type Output = VolumeSize;

    fn add(self, rhs: VolumeSize) -> VolumeSize {
        VolumeSize {
            mb: self.mb.saturating_add(rhs.mb),
            lo: self.lo.wrapping_add(rhs.lo),
        }
    }
}

impl AddAssign for VolumeSize {
    fn add_assign(&mut self, rhs: VolumeSize) {
        *self = *self + rhs;
    }
}

impl Sum for VolumeSize {
    fn sum<I: Iterator<Item = VolumeSize>>(iter: I) -> Self {
        iter.fold(VolumeSize::ZERO, Add::add)
    }
}

/// One server's ring buffers. Slot pointers are signed; a negative `day_slot` means the
/// provider's clock was not trusted when the snapshot was taken.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeSnapshot {
    #[serde(default, rename = "ServerID")]
    pub server_id: i64,
    pub first_day: i64,
    pub day_slot: i64,
    #[serde(default)]
    pub hour_slot: i64,
    #[serde(default)]
    pub min_slot: i64,
    #[serde(default)]
    pub sec_slot: i64,
    #[serde(default)]
    pub bytes_per_seconds: Vec<Option<VolumeSize>>,
    #[serde(default)]
    pub bytes_per_minutes: Vec<Option<VolumeSize>>,
    #[serde(default)]
    pub bytes_per_hours: Vec<Option<VolumeSize>>,
    #[serde(default)]
    pub bytes_per_days: Vec<Option<VolumeSize>>,
    #[serde(default, rename = "TotalSizeMB")]
    pub total_size_mb: u64,
    #[serde(default)]
    pub total_size_lo: u32,
    #[serde(default, rename = "CustomSizeMB")]
    pub custom_size_mb: u64,
    #[serde(default)]
    pub custom_size_lo: u32,
    /// Unix seconds of the last custom-counter reset (0 = never).
    #[serde(default)]
    pub custom_time: i64,
}

impl VolumeSnapshot {
    pub fn total(&self) -> VolumeSize {
        VolumeSize::new(self.total_size_mb, self.total_size_lo)
    }

    pub fn custom(&self) -> VolumeSize {
        VolumeSize::new(self.custom_size_mb, self.custom_size_lo)
    }

    pub fn set_custom(&mut self, size: VolumeSize) {
        self.custom_size_mb = size.mb;
        self.custom_size_lo = size.lo;
    }

    /// Epoch day of the newest entry in the day buffer.
    pub fn last_day(&self) -> i64 {
        self.first_day + self.bytes_per_days.len() as i64 - 1
    }

    /// Day-buffer value at a raw (possibly out of range) index.
    pub fn day_at(&self, index: i64) -> Option<VolumeSize> {
        slot_value(&self.bytes_per_days, index)
    }

    /// Day-buffer value for a calendar epoch day.
    pub fn day_value(&self, epoch_day: i64) -> Option<VolumeSize> {
        self.day_at(epoch_day - self.first_day)
    }
}

/// Value of a ring slot; indices outside the buffer are absent.
pub fn slot_value(values: &[Option<VolumeSize>], index: i64) -> Option<VolumeSize> {
    usize::try_from(index)
        .ok()
        .and_then(|i| values.get(i).copied())
        .flatten()
}

/// Which server a view or counter refers to. Index 0 on the wire is the aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "usize", into = "usize")]
pub enum ServerScope {
    #[default]
    All,
    Server(usize),
}

impl ServerScope {
    pub fn index(self) -> usize {
        match self {
            ServerScope::All => 0,
            ServerScope::Server(n) => n,
        }
    }
}

impl From<usize> for ServerScope {
    fn from(index: usize) -> Self {
        if index == 0 {
            ServerScope::All
        } else {
            ServerScope::Server(index)
        }
    }
}

impl From<ServerScope> for usize {
    fn from(scope: ServerScope) -> usize {
        scope.index()
    }
}

/// One poll's worth of snapshots: entry 0 is the aggregate, then one per configured server.
/// Never empty; replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeBatch {
    servers: Vec<VolumeSnapshot>,
}

impl VolumeBatch {
    pub fn new(servers: Vec<VolumeSnapshot>) -> Option<Self> {
        if servers.is_empty() {
            None
        } else {
            Some(Self { servers })
        }
    }

    pub fn aggregate(&self) -> &VolumeSnapshot {
        &self.servers[0]
    }

    pub fn server(&self, scope: ServerScope) -> Option<&VolumeSnapshot> {
        self.servers.get(scope.index())
    }

    pub fn servers(&self) -> &[VolumeSnapshot] {
        &self.servers
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Offset to add to an aggregate day index to address the same calendar day in `scope`.
    pub fn slot_delta(&self, scope: ServerScope) -> Option<i64> {
        self.server(scope)
            .map(|s| self.aggregate().first_day - s.first_day)
    }
}
