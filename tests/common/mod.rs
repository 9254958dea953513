// Shared test helpers
#![allow(dead_code)]

use chrono::NaiveDate;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use volstats::calendar::date_to_day;
use volstats::models::*;
use volstats::provider::{ProviderError, VolumeProvider};

pub fn mb(n: u64) -> Option<VolumeSize> {
    Some(VolumeSize::from_mb(n))
}

pub fn day(y: i32, m: u32, d: u32) -> i64 {
    date_to_day(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// A server whose day buffer starts at `first_day` with "today" at `day_slot`.
pub fn snapshot(first_day: i64, day_slot: i64, days: Vec<Option<VolumeSize>>) -> VolumeSnapshot {
    VolumeSnapshot {
        first_day,
        day_slot,
        bytes_per_seconds: vec![None; 60],
        bytes_per_minutes: vec![None; 60],
        bytes_per_hours: vec![None; 24],
        bytes_per_days: days,
        ..Default::default()
    }
}

/// Day buffer filled with `value` MB for every day from `first_day` through `last_day`.
pub fn uniform_days(first_day: i64, last_day: i64, value: u64) -> VolumeSnapshot {
    let days = (first_day..=last_day).map(|_| mb(value)).collect();
    snapshot(first_day, last_day - first_day, days)
}

pub fn batch(servers: Vec<VolumeSnapshot>) -> VolumeBatch {
    VolumeBatch::new(servers).unwrap()
}

/// In-memory provider recording resets; can be switched to fail.
#[derive(Default)]
pub struct StaticProvider {
    pub servers: Mutex<Vec<VolumeSnapshot>>,
    pub fail: AtomicBool,
    pub fetches: AtomicUsize,
    pub resets: Mutex<Vec<ServerScope>>,
}

impl StaticProvider {
    pub fn new(servers: Vec<VolumeSnapshot>) -> Self {
        Self {
            servers: Mutex::new(servers),
            ..Default::default()
        }
    }
}

impl VolumeProvider for StaticProvider {
    fn fetch_volume_snapshots(&self) -> BoxFuture<'_, Result<VolumeBatch, ProviderError>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail.load(Ordering::SeqCst) {
            Err(ProviderError::Io(std::io::Error::other("provider offline")))
        } else {
            VolumeBatch::new(self.servers.lock().unwrap().clone()).ok_or(ProviderError::Empty)
        };
        futures_util::future::ready(result).boxed()
    }

    fn reset_custom_counter(&self, scope: ServerScope) -> BoxFuture<'_, Result<(), ProviderError>> {
        let mut servers = self.servers.lock().unwrap();
        let result = match servers.get_mut(scope.index()) {
            Some(server) => {
                server.set_custom(VolumeSize::ZERO);
                server.custom_time = 1_700_000_000;
                self.resets.lock().unwrap().push(scope);
                Ok(())
            }
            None => Err(ProviderError::UnknownServer(scope.index())),
        };
        futures_util::future::ready(result).boxed()
    }
}
