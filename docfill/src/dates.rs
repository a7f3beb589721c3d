//! Date handling for scanned identity data.
//!
//! Scanners emit compact `DDMMYYYY` strings, mobile apps send `YYYYMMDD`,
//! manual entry uses whatever separator the operator types. Templates
//! always display `DD/MM/YYYY`.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

/// `chrono` format string for the display date.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

lazy_static! {
    static ref LOOSE_DATE_REGEX: Regex =
        Regex::new(r"^\s*(\d{1,2})\D(\d{1,2})\D(\d{2}|\d{4})\s*$").unwrap();
    static ref DISPLAY_DATE_REGEX: Regex = Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap();
}

/// Reformats an 8-digit compact date to `DD/MM/YYYY`.
///
/// `YYYYMMDD` is preferred when the leading four digits are a plausible year
/// and the whole string is a valid date; otherwise `DDMMYYYY` is tried.
/// Returns `None` for anything that is not a valid 8-digit date.
///
/// # Example
/// ```rust
/// use docfill::dates::reformat_compact_date;
/// assert_eq!(reformat_compact_date("20250101").as_deref(), Some("01/01/2025"));
/// assert_eq!(reformat_compact_date("02091968").as_deref(), Some("02/09/1968"));
/// assert_eq!(reformat_compact_date("12345678"), None);
/// ```
pub fn reformat_compact_date(value: &str) -> Option<String> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let num = |range: std::ops::Range<usize>| value[range].parse::<u32>().ok();

    let year_first = num(0..4)
        .filter(|year| (1900..=2100).contains(year))
        .and_then(|year| NaiveDate::from_ymd_opt(year as i32, num(4..6)?, num(6..8)?));
    let date = year_first.or_else(|| {
        NaiveDate::from_ymd_opt(num(4..8)? as i32, num(2..4)?, num(0..2)?)
    })?;
    Some(date.format(DISPLAY_DATE_FORMAT).to_string())
}

/// Canonicalizes a date typed with any separator (`1-2-90`, `01.02.1990`) or in compact form.
///
/// Two-digit years above 30 are read as 19xx, the rest as 20xx.
pub fn normalize_loose_date(value: &str) -> Option<String> {
    if let Some(compact) = reformat_compact_date(value.trim()) {
        return Some(compact);
    }
    let caps = LOOSE_DATE_REGEX.captures(value)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year_text = &caps[3];
    let mut year: i32 = year_text.parse().ok()?;
    if year_text.len() == 2 {
        year += if year > 30 { 1900 } else { 2000 };
    }
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
}

/// Splits a `DD/MM/YYYY`-shaped value into its day, month and year text.
pub fn split_display_date(value: &str) -> Option<(String, String, String)> {
    let caps = DISPLAY_DATE_REGEX.captures(value.trim())?;
    Some((caps[1].to_string(), caps[2].to_string(), caps[3].to_string()))
}

/// Convenience fields describing `now`, in the order they are injected.
pub fn current_date_fields(now: NaiveDateTime) -> Vec<(&'static str, String)> {
    let date = now.format(DISPLAY_DATE_FORMAT).to_string();
    let time = now.format("%H:%M:%S").to_string();
    vec![
        ("current_date", date.clone()),
        ("current_time", time.clone()),
        ("current_datetime", format!("{} {}", time, date)),
        ("current_year", now.year().to_string()),
        ("current_month", format!("{:02}", now.month())),
        ("current_day", format!("{:02}", now.day())),
        ("ngay_hientai", now.day().to_string()),
        ("thang_hientai", now.month().to_string()),
        ("nam_hientai", now.year().to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reformat_compact_year_first() {
        assert_eq!(reformat_compact_date("19900101").as_deref(), Some("01/01/1990"));
        assert_eq!(reformat_compact_date("20241231").as_deref(), Some("31/12/2024"));
    }

    #[test]
    fn test_reformat_compact_day_first() {
        assert_eq!(reformat_compact_date("31121999").as_deref(), Some("31/12/1999"));
        assert_eq!(reformat_compact_date("01012020").as_deref(), Some("01/01/2020"));
    }

    #[test]
    fn test_reformat_compact_rejects_non_dates() {
        assert_eq!(reformat_compact_date("1234567"), None);
        assert_eq!(reformat_compact_date("123456789"), None);
        assert_eq!(reformat_compact_date("2025010a"), None);
        assert_eq!(reformat_compact_date("99999999"), None);
        assert_eq!(reformat_compact_date("01/01/20"), None);
    }

    #[test]
    fn test_normalize_loose_date() {
        assert_eq!(normalize_loose_date("1-2-90").as_deref(), Some("01/02/1990"));
        assert_eq!(normalize_loose_date("01.02.2015").as_deref(), Some("01/02/2015"));
        assert_eq!(normalize_loose_date("5/6/07").as_deref(), Some("05/06/2007"));
        assert_eq!(normalize_loose_date("01/01/1990").as_deref(), Some("01/01/1990"));
        assert_eq!(normalize_loose_date("02091968").as_deref(), Some("02/09/1968"));
        assert_eq!(normalize_loose_date("31/02/2000"), None);
        assert_eq!(normalize_loose_date("không rõ"), None);
    }

    #[test]
    fn test_split_display_date() {
        assert_eq!(
            split_display_date("01/02/1990"),
            Some(("01".to_string(), "02".to_string(), "1990".to_string()))
        );
        assert_eq!(split_display_date("1990-02-01"), None);
        assert_eq!(split_display_date("01/02/90"), None);
    }

    #[test]
    fn test_current_date_fields() {
        let now = NaiveDate::from_ymd_opt(2026, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap();
        let fields = current_date_fields(now);
        let get = |key: &str| {
            fields
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };
        assert_eq!(get("current_date"), "07/03/2026");
        assert_eq!(get("current_time"), "09:05:01");
        assert_eq!(get("current_datetime"), "09:05:01 07/03/2026");
        assert_eq!(get("current_year"), "2026");
        assert_eq!(get("current_month"), "03");
        assert_eq!(get("current_day"), "07");
        assert_eq!(get("ngay_hientai"), "7");
        assert_eq!(get("thang_hientai"), "3");
    }
}
