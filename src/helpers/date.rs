//! Date helper functions

use chrono::{DateTime, Local, TimeZone};

/// Display format used on post listings ("January 5, 2024")
pub const DISPLAY_DATE_FORMAT: &str = "%B %-d, %Y";

/// Format a date with a chrono format string
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format(format).to_string()
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Human readable form of a front-matter date
///
/// Dates that cannot be parsed are shown as written.
pub fn display_date(raw: &str, parsed: Option<DateTime<Local>>, format: &str) -> String {
    match parsed {
        Some(date) => format_date(&date, format),
        None => raw.to_string(),
    }
}
