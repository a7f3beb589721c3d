//! Format detection for incoming scan payloads.
//!
//! This module exposes [`parse`], which classifies a raw payload as JSON, one of
//! the legacy delimited layouts, or unrecognised text, and the [`Payload`]
//! tagged result every later stage consumes.

pub mod delimited;
pub mod json;

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use delimited::DelimitedLayout;

use crate::{
    Error,
    aliases::{CanonicalField, canonical_for_header, fold_text},
    dates::{normalize_loose_date, reformat_compact_date},
    types::{RawInput, Record},
};

/// The detected encoding of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    /// JSON text or an already parsed value.
    Json,
    /// A header line paired with a values line.
    Header,
    /// Positional `|` separated fields.
    Pipe,
    /// Positional `,` separated fields.
    Comma,
    /// Nothing recognisable; only the `raw` sentinel is available.
    Raw,
}

/// Implements [`std::fmt::Display`] for [`PayloadFormat`].
///
/// # Example
/// ```rust
/// use docfill::formats::PayloadFormat;
/// assert_eq!(PayloadFormat::Json.to_string(), "json");
/// assert_eq!(PayloadFormat::Header.to_string(), "header");
/// ```
impl Display for PayloadFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadFormat::Json => write!(f, "json"),
            PayloadFormat::Header => write!(f, "header"),
            PayloadFormat::Pipe => write!(f, "pipe"),
            PayloadFormat::Comma => write!(f, "comma"),
            PayloadFormat::Raw => write!(f, "raw"),
        }
    }
}

/// Accepts the display names case-insensitively, plus `csv` for comma and `text` for raw.
///
/// Returns [`crate::error::Error::Validation`] for unknown strings.
impl FromStr for PayloadFormat {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(PayloadFormat::Json),
            "header" => Ok(PayloadFormat::Header),
            "pipe" => Ok(PayloadFormat::Pipe),
            "comma" | "csv" => Ok(PayloadFormat::Comma),
            "raw" | "text" => Ok(PayloadFormat::Raw),
            other => Err(Error::validation_error(format!(
                "unknown payload format `{}`",
                other
            ))),
        }
    }
}

impl From<DelimitedLayout> for PayloadFormat {
    fn from(layout: DelimitedLayout) -> Self {
        match layout {
            DelimitedLayout::HeaderPaired => PayloadFormat::Header,
            DelimitedLayout::Pipe => PayloadFormat::Pipe,
            DelimitedLayout::Comma => PayloadFormat::Comma,
        }
    }
}

/// A parsed payload, tagged with how it was understood.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Record),
    Delimited {
        layout: DelimitedLayout,
        record: Record,
    },
    /// Unrecognised input: `raw` holds the original text, the seven canonical fields are empty.
    Raw(Record),
}

impl Payload {
    pub fn format(&self) -> PayloadFormat {
        match self {
            Payload::Json(_) => PayloadFormat::Json,
            Payload::Delimited { layout, .. } => (*layout).into(),
            Payload::Raw(_) => PayloadFormat::Raw,
        }
    }

    pub fn record(&self) -> &Record {
        match self {
            Payload::Json(record) | Payload::Raw(record) => record,
            Payload::Delimited { record, .. } => record,
        }
    }

    pub fn into_record(self) -> Record {
        match self {
            Payload::Json(record) | Payload::Raw(record) => record,
            Payload::Delimited { record, .. } => record,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Payload::Raw(_))
    }
}

/// Detects the encoding of `input` and flattens it into a record.
///
/// Never fails: unrecognised text degrades to [`Payload::Raw`].
///
/// # Example
/// ```rust
/// use docfill::formats::{parse, PayloadFormat};
/// let pipe = "012345678901|012345678|Nguyen Van A|01/01/1990|Nam|123 Main St|01/01/2020";
/// let payload = parse(pipe);
/// assert_eq!(payload.format(), PayloadFormat::Pipe);
/// assert_eq!(payload.record()["hoTen"], "Nguyen Van A");
///
/// let payload = parse("not json {{{");
/// assert!(payload.is_raw());
/// assert_eq!(payload.record()["raw"], "not json {{{");
/// ```
pub fn parse(input: impl Into<RawInput>) -> Payload {
    let payload = match input.into() {
        RawInput::Value(value) => Payload::Json(json::value_to_record(value)),
        RawInput::Text(text) => parse_str(&text),
    };
    log::debug!("payload detected as {}", payload.format());
    post_process(payload)
}

/// Caller-level wrapper: like [`parse`], but rejects input with nothing to parse.
pub fn parse_text(input: &str) -> Result<Payload, Error> {
    if input.trim().is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(parse(input))
}

fn parse_str(text: &str) -> Payload {
    if let Some(record) = json::parse_json_record(text) {
        return Payload::Json(record);
    }
    if let Some((layout, record)) = delimited::parse_delimited(text) {
        return Payload::Delimited { layout, record };
    }
    log::warn!("payload matched no known format, keeping raw text");
    Payload::Raw(delimited::raw_fallback(text))
}

fn post_process(payload: Payload) -> Payload {
    match payload {
        Payload::Json(record) => Payload::Json(tidy_values(record)),
        Payload::Delimited { layout, record } => Payload::Delimited {
            layout,
            record: tidy_values(record),
        },
        raw @ Payload::Raw(_) => raw,
    }
}

/// Reformats compact dates everywhere, and loose dates / gender spellings on their known fields.
fn tidy_values(mut record: Record) -> Record {
    for (key, value) in record.iter_mut() {
        let Value::String(text) = value else {
            continue;
        };
        let replacement = match canonical_for_header(key) {
            Some(field) if field.is_date() => normalize_loose_date(text),
            Some(CanonicalField::Gender) => normalize_gender(text),
            _ => reformat_compact_date(text),
        };
        if let Some(replacement) = replacement {
            *text = replacement;
        }
    }
    record
}

/// Maps the spellings scanners and mobile apps use onto `Nam` / `Nữ`.
pub fn normalize_gender(value: &str) -> Option<String> {
    match fold_text(value.trim()).as_str() {
        "m" | "male" | "nam" | "1" => Some("Nam".to_string()),
        "f" | "female" | "nu" | "0" => Some("Nữ".to_string()),
        _ => None,
    }
}
