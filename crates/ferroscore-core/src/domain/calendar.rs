use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::ValidationError;

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_iso_date(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        ValidationError::InvalidDate {
            value: input.to_owned(),
        }
    })
}

/// Format a calendar date as `YYYY-MM-DD`.
pub fn format_iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Format an instant as an RFC3339 string in UTC.
pub fn format_rfc3339(value: OffsetDateTime) -> String {
    value
        .to_offset(time::UtcOffset::UTC)
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("<unformattable>"))
}

/// Parse the date/time shapes providers send us, normalized to UTC.
///
/// Accepted: `YYYY-MM-DD` (midnight UTC), RFC3339, and `YYYY-MM-DDTHH:MM:SS`
/// without an offset (read as UTC).
pub(crate) fn parse_flexible_datetime(input: &str) -> Option<OffsetDateTime> {
    let trimmed = input.trim();
    if let Ok(date) = parse_iso_date(trimmed) {
        return Some(date.midnight().assume_utc());
    }
    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(parsed.to_offset(time::UtcOffset::UTC));
    }
    PrimitiveDateTime::parse(
        trimmed,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .ok()
    .map(PrimitiveDateTime::assume_utc)
}
