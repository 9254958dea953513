// Size text for counters and tooltips.

use crate::models::{BYTES_PER_MB, Counter, VolumeSize};

pub const NO_DATA: &str = "no data";

/// Wrap a total with its display text; absent totals read "no data".
pub fn counter(size: Option<VolumeSize>) -> Counter {
    Counter {
        display: size.map_or_else(|| NO_DATA.to_string(), format_size),
        raw: size,
    }
}

/// Human size text with about three significant digits: `0.49 MB`, `512 MB`, `1.50 GB`.
pub fn format_size(size: VolumeSize) -> String {
    let mb = if size.mb < 100 {
        size.lo as f64 / BYTES_PER_MB as f64
    } else {
        size.mb as f64
    };
    const GB: f64 = 1024.0;
    const TB: f64 = 1024.0 * 1024.0;

    if mb >= TB * 100.0 {
        format!("{:.0} TB", mb / TB)
    } else if mb >= TB * 10.0 {
        format!("{:.1} TB", mb / TB)
    } else if mb >= GB * 1000.0 {
        format!("{:.2} TB", mb / TB)
    } else if mb >= GB * 100.0 {
        format!("{:.0} GB", mb / GB)
    } else if mb >= GB * 10.0 {
        format!("{:.1} GB", mb / GB)
    } else if mb >= 1000.0 {
        format!("{:.2} GB", mb / GB)
    } else if mb >= 100.0 {
        format!("{:.0} MB", mb)
    } else if mb >= 10.0 {
        format!("{:.1} MB", mb)
    } else {
        format!("{:.2} MB", mb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_picks_precision_by_magnitude() {
        assert_eq!(format_size(VolumeSize::from_bytes(512 * 1024)), "0.50 MB");
        assert_eq!(format_size(VolumeSize::from_mb(12)), "12.0 MB");
        assert_eq!(format_size(VolumeSize::from_mb(512)), "512 MB");
        assert_eq!(format_size(VolumeSize::from_mb(1536)), "1.50 GB");
        assert_eq!(format_size(VolumeSize::from_mb(12 * 1024)), "12.0 GB");
        assert_eq!(format_size(VolumeSize::from_mb(1024 * 1024)), "1.00 TB");
    }

    #[test]
    fn format_size_ignores_wrapped_low_part_for_large_sizes() {
        // 5 GiB: the low 32 bits alone would read as 1 GiB.
        let size = VolumeSize::from_bytes(5 * 1024 * 1024 * 1024);
        assert_eq!(format_size(size), "5.00 GB");
    }

    #[test]
    fn absent_counter_reads_no_data() {
        let c = counter(None);
        assert_eq!(c.display, NO_DATA);
        assert_eq!(c.raw, None);
    }
}
