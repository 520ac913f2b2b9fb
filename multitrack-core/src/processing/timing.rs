//! Pure time helpers for track lengths and the playback clock display.
//!
//! Durations are derived from fragment counts and a fixed per-fragment
//! interval, so they are reproducible without decoding any audio.

use std::time::Duration;

/// Length of `fragment_count` fragments of `fragment_interval` each.
///
/// Saturates instead of overflowing for absurdly long tracks.
pub fn track_duration(fragment_count: usize, fragment_interval: Duration) -> Duration {
    let count = u32::try_from(fragment_count).unwrap_or(u32::MAX);
    fragment_interval.saturating_mul(count)
}

/// Format as `mm:ss`, truncating sub-second precision.
///
/// Minutes are not wrapped into hours: 75 minutes renders as `75:00`.
pub fn format_mm_ss(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
