//! Legacy delimited scanner output.
//!
//! Handheld QR/ID scanners produce either a header line plus a values line
//! (in either order), or a single positional line
//! `CCCD|CMND|Họ tên|Ngày sinh|Giới tính|Địa chỉ|Ngày cấp`. Some older
//! integrations send the same seven fields comma separated.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    aliases::{CanonicalField, canonical_for_header},
    types::{Record, is_blank},
};

/// Minimum number of recognised header tokens for a line to count as a header.
pub const MIN_HEADER_HITS: usize = 2;

/// Minimum number of parts for the positional layouts.
pub const POSITIONAL_FIELD_COUNT: usize = 7;

/// How a delimited payload was laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelimitedLayout {
    /// A `|` separated header line paired with a values line.
    HeaderPaired,
    /// Seven or more `|` separated positional values.
    Pipe,
    /// Seven or more `,` separated positional values.
    Comma,
}

impl Display for DelimitedLayout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DelimitedLayout::HeaderPaired => write!(f, "header"),
            DelimitedLayout::Pipe => write!(f, "pipe"),
            DelimitedLayout::Comma => write!(f, "comma"),
        }
    }
}

/// Tries every layout in priority order.
pub fn parse_delimited(input: &str) -> Option<(DelimitedLayout, Record)> {
    if let Some(record) = parse_header_paired(input) {
        return Some((DelimitedLayout::HeaderPaired, record));
    }
    if let Some(record) = parse_positional(input, b'|') {
        return Some((DelimitedLayout::Pipe, record));
    }
    parse_positional(input, b',').map(|record| (DelimitedLayout::Comma, record))
}

/// Splits the input into cleaned, trimmed, non-empty lines.
pub fn split_lines(input: &str) -> Vec<&str> {
    input
        .split(['\n', '\r', '\u{2028}', '\u{2029}'])
        .map(|line| line.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}'))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Pairs a values line with a header line.
///
/// Every ordered pair `(values = i, header = j)` with `i != j` is tried in
/// iteration order and the first pair whose header has at least
/// [`MIN_HEADER_HITS`] recognised tokens wins.
pub fn parse_header_paired(input: &str) -> Option<Record> {
    let lines = split_lines(input);
    if lines.len() < 2 {
        return None;
    }

    for (i, values_line) in lines.iter().enumerate() {
        for (j, header_line) in lines.iter().enumerate() {
            if i == j {
                continue;
            }
            let header: Vec<Option<CanonicalField>> = header_line
                .split('|')
                .map(canonical_for_header)
                .collect();
            if header.iter().flatten().count() < MIN_HEADER_HITS {
                continue;
            }

            log::debug!("header line {} paired with values line {}", j, i);
            let values: Vec<&str> = values_line.split('|').map(str::trim).collect();
            let mut record = Record::new();
            for (field, value) in header.iter().zip(values.iter()) {
                let Some(field) = field else {
                    continue;
                };
                if is_blank(record.get(field.key())) {
                    record.insert(field.key().to_string(), Value::String(value.to_string()));
                }
            }
            return Some(record);
        }
    }
    None
}

/// Maps the first seven parts onto [`CanonicalField::POSITIONAL`].
///
/// Parts are split with the `csv` reader, so comma payloads may quote a value
/// that itself contains a comma.
pub fn parse_positional(input: &str, delimiter: u8) -> Option<Record> {
    let parts = split_fields(input.trim(), delimiter)?;
    if parts.len() < POSITIONAL_FIELD_COUNT {
        return None;
    }

    let mut record = Record::new();
    for (field, value) in CanonicalField::POSITIONAL.iter().zip(parts) {
        record.insert(field.key().to_string(), Value::String(value));
    }
    Some(record)
}

fn split_fields(input: &str, delimiter: u8) -> Option<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .quoting(delimiter == b',')
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());

    let mut parts = Vec::new();
    for result in rdr.records() {
        match result {
            Ok(row) => parts.extend(row.iter().map(str::to_string)),
            Err(e) => {
                log::debug!("delimited split failed: {}", e);
                return None;
            }
        }
    }
    Some(parts)
}

/// The sentinel record for input no layout understood.
pub fn raw_fallback(input: &str) -> Record {
    let mut record = Record::new();
    record.insert("raw".to_string(), Value::String(input.to_string()));
    for field in CanonicalField::POSITIONAL {
        record.insert(field.key().to_string(), Value::String(String::new()));
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use serde_json::json;

    #[test]
    fn test_header_below_values() {
        let input = indoc! {"
            079123456789|Nguyễn Văn A|01011990
            Số CCCD|Họ và tên|Ngày sinh
        "};
        let record = parse_header_paired(input).unwrap();
        assert_eq!(record.get("cccd"), Some(&json!("079123456789")));
        assert_eq!(record.get("hoTen"), Some(&json!("Nguyễn Văn A")));
        assert_eq!(record.get("ngaySinh"), Some(&json!("01011990")));
    }

    #[test]
    fn test_header_above_values() {
        let input = "cccd|ho_ten|ghi_chu\n001|Trần B|x";
        let record = parse_header_paired(input).unwrap();
        assert_eq!(record.get("cccd"), Some(&json!("001")));
        assert_eq!(record.get("hoTen"), Some(&json!("Trần B")));
        assert!(!record.contains_key("ghi_chu"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_header_needs_two_hits() {
        assert!(parse_header_paired("ho_ten|abc\nA|B").is_none());
        assert!(parse_header_paired("cccd|ho_ten").is_none());
    }

    #[test]
    fn test_header_with_short_values_line() {
        let record = parse_header_paired("cccd|ho_ten|dia_chi\n001").unwrap();
        assert_eq!(record.get("cccd"), Some(&json!("001")));
        assert!(!record.contains_key("hoTen"));
    }

    #[test]
    fn test_positional_pipe() {
        let record = parse_positional("1|2|Tên|01/01/1990|Nam|HN|02/02/2020", b'|').unwrap();
        assert_eq!(record.get("cccd"), Some(&json!("1")));
        assert_eq!(record.get("ngayCap"), Some(&json!("02/02/2020")));
        assert_eq!(record.len(), 7);
    }

    #[test]
    fn test_positional_comma_with_quotes() {
        let input = r#"1,2,Lê C,01/01/1990,Nữ,"12 Phố Huế, Hà Nội",02/02/2020"#;
        let record = parse_positional(input, b',').unwrap();
        assert_eq!(record.get("diaChi"), Some(&json!("12 Phố Huế, Hà Nội")));
        assert_eq!(record.get("ngayCap"), Some(&json!("02/02/2020")));
    }

    #[test]
    fn test_positional_too_short() {
        assert!(parse_positional("1|2|3", b'|').is_none());
        assert!(parse_positional("a,b", b',').is_none());
    }

    #[test]
    fn test_parse_delimited_priority() {
        let (layout, _) = parse_delimited("1|2|3|4|5|6|7").unwrap();
        assert_eq!(layout, DelimitedLayout::Pipe);
        let (layout, _) = parse_delimited("1,2,3,4,5,6,7").unwrap();
        assert_eq!(layout, DelimitedLayout::Comma);
        assert!(parse_delimited("hello world").is_none());
    }

    #[test]
    fn test_raw_fallback() {
        let record = raw_fallback("???");
        assert_eq!(record.get("raw"), Some(&json!("???")));
        assert_eq!(record.get("hoTen"), Some(&json!("")));
        assert_eq!(record.len(), 8);
    }

    #[test]
    fn test_split_lines_cleans_separators() {
        let lines = split_lines("\u{FEFF}a\r\n\n  b \u{2028}c");
        assert_eq!(lines, vec!["a", "b", "c"]);
    }
}
