//! Byte formatting for log output.

/// Formats a byte count with one fractional unit: "512B", "1.5KB", "4.0MB".
///
/// The values logged here are admission parameters and freed-byte totals,
/// which live between bytes and a few dozen megabytes, so a single unit
/// with one decimal reads better in telemetry than an exact breakdown.
pub fn fmt_mem(bytes: i64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let b = bytes as f64;
    if b >= GB {
        format!("{:.1}GB", b / GB)
    } else if b >= MB {
        format!("{:.1}MB", b / MB)
    } else if b >= KB {
        format!("{:.1}KB", b / KB)
    } else {
        format!("{}B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_mem() {
        assert_eq!(fmt_mem(0), "0B");
        assert_eq!(fmt_mem(512), "512B");
        assert_eq!(fmt_mem(1024), "1.0KB");
        assert_eq!(fmt_mem(1536), "1.5KB");
        assert_eq!(fmt_mem(262144), "256.0KB");
        assert_eq!(fmt_mem(1 << 20), "1.0MB");
        assert_eq!(fmt_mem(64 << 20), "64.0MB");
        assert_eq!(fmt_mem(3 << 29), "1.5GB");
    }
}
