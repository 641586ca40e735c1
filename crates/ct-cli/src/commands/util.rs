//! Small helpers shared by the subcommands.

use chrono::{SecondsFormat, Utc};

/// Returns the current time as an RFC 3339 UTC string, the format every
/// timestamp is stored in.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Formats minutes as a duration string.
///
/// Returns "Xh Ym" if >= 1 hour, "Xm" otherwise. Negative values render
/// as "0m".
pub fn format_minutes(minutes: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let total = minutes.round().max(0.0) as i64;
    let hours = total / 60;
    let remainder = total % 60;

    if hours >= 1 {
        format!("{hours}h {remainder}m")
    } else {
        format!("{remainder}m")
    }
}
