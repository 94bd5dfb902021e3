//! Calendar date parsing and formatting for collision records.
//!
//! Collision files and interactive queries both use the US `MM/DD/YYYY`
//! layout, so every date entering the system goes through
//! [`parse_collision_date`].

use chrono::NaiveDate;

/// `chrono` format string for `MM/DD/YYYY` dates.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Parses a `MM/DD/YYYY` date, ignoring surrounding whitespace.
///
/// Returns `None` for empty strings, other layouts, and impossible calendar
/// dates such as `02/30/2017`.
#[must_use]
pub fn parse_collision_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).ok()
}

/// Formats a date as `MM/DD/YYYY`.
#[must_use]
pub fn format_collision_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
