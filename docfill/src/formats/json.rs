//! JSON payloads from the mobile companion app and the socket channel.
//!
//! Strict parsing is attempted first; on failure a lenient repair pass fixes the
//! damage copy/paste and chat apps typically do (typographic quotes, trailing
//! commas, stray BOM and line-separator characters) before retrying.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::types::Record;

lazy_static! {
    static ref TRAILING_COMMA_REGEX: Regex = Regex::new(r",\s*([}\]])").unwrap();
}

/// Wraps any JSON value into a record: arrays under `data`, scalars under `value`.
pub fn value_to_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        Value::Array(items) => {
            let mut record = Record::new();
            record.insert("data".to_string(), Value::Array(items));
            record
        }
        scalar => {
            let mut record = Record::new();
            record.insert("value".to_string(), scalar);
            record
        }
    }
}

/// Strict parse followed by one lenient retry. `None` means "not JSON".
pub fn parse_json_record(input: &str) -> Option<Record> {
    match serde_json::from_str::<Value>(input) {
        Ok(value) => return Some(value_to_record(value)),
        Err(e) => log::debug!("strict JSON parse failed: {}", e),
    }

    let repaired = repair_json(input);
    if repaired == input {
        return None;
    }
    match serde_json::from_str::<Value>(&repaired) {
        Ok(value) => {
            log::debug!("JSON parsed after lenient repair");
            Some(value_to_record(value))
        }
        Err(_) => None,
    }
}

/// Applies the lenient repairs without validating the result.
pub fn repair_json(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| !matches!(c, '\u{FEFF}' | '\u{2028}' | '\u{2029}'))
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();
    TRAILING_COMMA_REGEX
        .replace_all(cleaned.trim(), "$1")
        .into_owned()
}
