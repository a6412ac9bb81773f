use std::fmt;
use std::time::Duration;

/// Formats a `Duration` the way log messages in this crate report retry
/// intervals and timeouts, e.g. `500ms` or `10s`.
pub fn human(d: Duration) -> impl fmt::Display {
	humantime::format_duration(d)
}
