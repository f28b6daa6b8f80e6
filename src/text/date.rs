//! Birthday formatting for the card back.

use crate::error::{Error, Result};

use chrono::{Datelike, NaiveDate};

/// Formats an ISO `YYYY-MM-DD` date as `"<Month> <day><suffix>"`, e.g. `"March 15th"`.
pub fn format_birthday(iso: &str) -> Result<String> {
    let iso = iso.trim();
    let date = NaiveDate::parse_from_str(iso, "%Y-%m-%d").map_err(|e| Error::invalid_date(iso, e))?;
    let day = date.day();
    Ok(format!("{} {day}{}", date.format("%B"), ordinal_suffix(day)))
}

/// English ordinal suffix for a day of the month.
pub fn ordinal_suffix(day: u32) -> &'static str {
    match day {
        1 | 21 | 31 => "st",
        2 | 22 => "nd",
        3 | 23 => "rd",
        _ => "th",
    }
}
