//! Paddle date and time formats.
//!
//! Paddle sends naive timestamps (`YYYY-MM-DD HH:MM:SS`) and bare dates
//! (`YYYY-MM-DD`). Both are read in the configured local offset and stored
//! as UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

pub const PADDLE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const PADDLE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a Paddle timestamp or date in the given local offset.
///
/// Returns `None` when the value matches neither format.
pub fn parse_paddle_time(value: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let naive = NaiveDateTime::parse_from_str(value, PADDLE_DATETIME_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, PADDLE_DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

/// Formats a UTC instant as Paddle would send it in the given offset.
pub fn format_paddle_time(value: DateTime<Utc>, offset: FixedOffset) -> String {
    value
        .with_timezone(&offset)
        .format(PADDLE_DATETIME_FORMAT)
        .to_string()
}

/// Parses a UTC offset such as `+00:00` or `-05:00`, or the aliases `UTC`
/// and `Z`.
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("utc") || value.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }
    value.parse().ok()
}
