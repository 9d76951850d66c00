use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::warn;

/// Full dates as they appear in registry exports
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%Y.%m.%d",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Month-year forms; parsed with the day pinned to the 1st
const MONTH_FORMATS: &[&str] = &["%B %Y", "%b %Y", "%Y-%m", "%m/%Y"];

/// Parse free-form date text. Missing or blank input is `None` without logging;
/// text that matches no known form is logged once and becomes `None`.
pub fn coerce_date(raw: Option<&str>) -> Option<NaiveDate> {
    let text = raw.map(str::trim).filter(|s| !s.is_empty())?;
    let parsed = parse_date(text);
    if parsed.is_none() {
        warn!(date_str = %text, "Date parsing error");
    }
    parsed
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    // Month-year goes first: "%B %d %Y" would otherwise read "January 2020"
    // as day 20 of year 20. chrono needs a day to build a NaiveDate.
    if let Some(date) = MONTH_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&format!("1 {text}"), &format!("%d {fmt}")).ok())
    {
        return Some(date);
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
    {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(dt.date());
    }

    if text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse().ok().and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1));
    }

    None
}
