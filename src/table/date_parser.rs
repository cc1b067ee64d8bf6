use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, ScrapeError};

/// `M/D/YYYY` or `M/D/YY`, the form Nasdaq uses for period headers and
/// dividend dates.
static US_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})$").expect("US date regex should be valid")
});

/// Parses a period-end label such as `"3/31/2020"`, `"2020-03-31"` or
/// `"Mar 31, 2020"` into a calendar date.
pub fn parse_period_date(text: &str) -> Result<NaiveDate> {
    let s = text.trim();
    if let Some(caps) = US_DATE.captures(s) {
        let month: u32 = caps[1].parse().map_err(|_| ScrapeError::date(text))?;
        let day: u32 = caps[2].parse().map_err(|_| ScrapeError::date(text))?;
        let year = expand_year(&caps[3]).ok_or_else(|| ScrapeError::date(text))?;
        return NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| ScrapeError::date(text));
    }

    ["%Y-%m-%d", "%Y/%m/%d", "%b %d, %Y", "%B %d, %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .ok_or_else(|| ScrapeError::date(text))
}

/// Strict `M/D/YYYY`; anything else (blank, "N/A", "--") becomes `None`.
pub fn parse_us_date(text: &str) -> Option<NaiveDate> {
    let caps = US_DATE.captures(text.trim())?;
    if caps[3].len() != 4 {
        return None;
    }
    NaiveDate::from_ymd_opt(caps[3].parse().ok()?, caps[1].parse().ok()?, caps[2].parse().ok()?)
}

// two-digit years pivot at 69, same as strptime's %y
fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    Some(match raw.len() {
        2 if year < 69 => 2000 + year,
        2 => 1900 + year,
        _ => year,
    })
}
