//! Position display helpers

/// Format milliseconds as `MM:SS`, or `HH:MM:SS` once past an hour
pub fn format_clock(ms: u64) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}

/// `position / duration` label for the progress bar
pub fn format_progress(position_ms: u64, duration_ms: u64) -> String {
    format!("{} / {}", format_clock(position_ms), format_clock(duration_ms))
}

/// Played fraction in [0, 1]; 0 while the duration is unknown
pub fn played_fraction(position_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    (position_ms as f64 / duration_ms as f64).min(1.0)
}

/// Absolute seek target for a normalized fraction, `None` while the duration is unknown
pub fn seek_target(fraction: f64, duration_ms: u64) -> Option<u64> {
    if duration_ms == 0 || !fraction.is_finite() {
        return None;
    }
    let fraction = fraction.clamp(0.0, 1.0);
    Some((fraction * duration_ms as f64).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65_999), "01:05");
        assert_eq!(format_clock(3_600_000), "01:00:00");
        assert_eq!(format_clock(5_025_000), "01:23:45");
    }

    #[test]
    fn test_format_progress() {
        assert_eq!(format_progress(42_000, 100_000), "00:42 / 01:40");
    }

    #[test]
    fn test_seek_target() {
        assert_eq!(seek_target(0.5, 100_000), Some(50_000));
        assert_eq!(seek_target(1.7, 100_000), Some(100_000));
        assert_eq!(seek_target(-0.2, 100_000), Some(0));
        assert_eq!(seek_target(0.5, 0), None);
        assert_eq!(seek_target(f64::NAN, 100_000), None);
    }

    #[test]
    fn test_played_fraction() {
        assert_eq!(played_fraction(500, 0), 0.0);
        assert_eq!(played_fraction(25_000, 100_000), 0.25);
        assert_eq!(played_fraction(120_000, 100_000), 1.0);
    }
}
