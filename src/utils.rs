/// Utility functions for timestamps and durations
use time::macros::format_description;
use time::OffsetDateTime;

/// Format a timestamp for the per-cycle output line
///
/// Produces the classic asctime layout, e.g. `Sun Oct 18 20:44:00 2026`.
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    let format = format_description!(
        "[weekday repr:short] [month repr:short] [day padding:space] [hour]:[minute]:[second] [year]"
    );
    dt.format(format).unwrap_or_else(|_| dt.to_string())
}

/// Convert a time::Duration to seconds as u64
///
/// Negative durations clamp to zero.
pub fn duration_to_seconds(duration: time::Duration) -> u64 {
    duration.whole_seconds().max(0) as u64
}
