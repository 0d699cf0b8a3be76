//! Date normalization for imported cells: text layouts and 1900-system serials.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

const ISO_DATE: &str = "%Y-%m-%d";

/// Serial of 9999-12-31, the last day spreadsheet software can represent.
const MAX_SERIAL: f64 = 2_958_465.0;

/// Text layouts tried, in order, for date cells that are not already `YYYY-MM-DD`.
const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%Y.%m.%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit())
}

/// Normalize free-form date text to `YYYY-MM-DD`.
///
/// `YYYY-MM-DD` passes through untouched. Returns `None` when no known layout
/// matches; callers keep the literal text in that case.
pub fn normalize_date(value: &str) -> Option<String> {
    let value = value.trim();
    if is_iso_date(value) {
        return Some(value.to_string());
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.date_naive().format(ISO_DATE).to_string());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        })
        .map(|date| date.format(ISO_DATE).to_string())
}

/// Convert a spreadsheet date serial (1900 date system) to `YYYY-MM-DD`.
///
/// Only the whole-day part is used. Serial 60 is the fictitious 1900-02-29
/// that spreadsheet software keeps for compatibility. Serials below 1 or past
/// 9999-12-31 carry no date.
pub fn serial_to_date(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 1.0 || serial >= MAX_SERIAL + 1.0 {
        return None;
    }
    let days = serial.floor() as i64;
    if days == 60 {
        return Some("1900-02-29".to_string());
    }
    // Serials past the phantom leap day are offset by one.
    let epoch = if days > 60 {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    };
    let date = epoch.checked_add_signed(Duration::try_days(days)?)?;
    Some(date.format(ISO_DATE).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_dates_pass_through() {
        assert_eq!(normalize_date("2024-01-15").as_deref(), Some("2024-01-15"));
        assert_eq!(normalize_date(" 2024-01-15 ").as_deref(), Some("2024-01-15"));
    }

    #[test]
    fn common_layouts_are_normalized() {
        assert_eq!(normalize_date("2024/03/05").as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date("03/05/2024").as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date("Mar 5, 2024").as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date("5 March 2024").as_deref(), Some("2024-03-05"));
        assert_eq!(
            normalize_date("2024-03-05T18:30:00Z").as_deref(),
            Some("2024-03-05")
        );
        assert_eq!(normalize_date("2024-3-5").as_deref(), Some("2024-03-05"));
    }

    #[test]
    fn unknown_text_is_not_a_date() {
        assert_eq!(normalize_date("next week"), None);
        assert_eq!(normalize_date(""), None);
    }

    #[test]
    fn serials_follow_1900_date_system() {
        assert_eq!(serial_to_date(1.0).as_deref(), Some("1900-01-01"));
        assert_eq!(serial_to_date(59.0).as_deref(), Some("1900-02-28"));
        assert_eq!(serial_to_date(60.0).as_deref(), Some("1900-02-29"));
        assert_eq!(serial_to_date(61.0).as_deref(), Some("1900-03-01"));
        assert_eq!(serial_to_date(45292.0).as_deref(), Some("2024-01-01"));
        assert_eq!(serial_to_date(45306.75).as_deref(), Some("2024-01-15"));
        assert_eq!(serial_to_date(0.0), None);
    }

    #[test]
    fn serials_outside_the_calendar_carry_no_date() {
        assert_eq!(serial_to_date(2_958_465.0).as_deref(), Some("9999-12-31"));
        assert_eq!(serial_to_date(2_958_466.0), None);
        assert_eq!(serial_to_date(1e15), None);
        assert_eq!(serial_to_date(f64::MAX), None);
        assert_eq!(serial_to_date(-3.0), None);
        assert_eq!(serial_to_date(f64::NAN), None);
    }
}
