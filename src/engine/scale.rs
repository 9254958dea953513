// Unit scaler: picks one display unit for everything plotted together.

use crate::models::{Unit, VolumeSize};

const TB_THRESHOLD_MB: u64 = 1024 * 1024;
const GB_THRESHOLD_MB: u64 = 1024;
const MB_THRESHOLD_MB: u64 = 1;
const KB_THRESHOLD_BYTES: u32 = 1024;

/// Choose the unit from the largest present value.
///
/// The megabyte part and the byte part are maximised separately. Thresholds apply in
/// order: TB above 1 TiB, GB above 1 GiB, MB above 1 MiB or when every byte part is zero,
/// KB above 1 KiB, otherwise bytes. No present values at all gives MB.
pub fn choose_unit<'a>(values: impl IntoIterator<Item = &'a Option<VolumeSize>>) -> Unit {
    let max = values
        .into_iter()
        .flatten()
        .fold(VolumeSize::ZERO, |acc, v| VolumeSize {
            mb: acc.mb.max(v.mb),
            lo: acc.lo.max(v.lo),
        });

    if max.mb > TB_THRESHOLD_MB {
        Unit::Terabyte
    } else if max.mb > GB_THRESHOLD_MB {
        Unit::Gigabyte
    } else if max.mb > MB_THRESHOLD_MB || max.lo == 0 {
        Unit::Megabyte
    } else if max.lo > KB_THRESHOLD_BYTES {
        Unit::Kilobyte
    } else {
        Unit::Byte
    }
}

/// Express one size in `unit`. Megabyte-based units come from the exact megabyte part;
/// KB and B divide the low byte part.
pub fn scale(size: VolumeSize, unit: Unit) -> f64 {
    match unit {
        Unit::Terabyte => size.mb as f64 / 1024.0 / 1024.0,
        Unit::Gigabyte => size.mb as f64 / 1024.0,
        Unit::Megabyte => size.megabytes(),
        Unit::Kilobyte => size.lo as f64 / 1024.0,
        Unit::Byte => size.lo as f64,
    }
}

pub fn scale_series(values: &[Option<VolumeSize>], unit: Unit) -> Vec<Option<f64>> {
    values.iter().map(|v| v.map(|s| scale(s, unit))).collect()
}
