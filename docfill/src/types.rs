//! Core value types shared by every stage of the fill pipeline.
//! Parsers produce [`Record`]s; the merger turns them into a [`FillState`].

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::Error;

/// A flat field name → scalar value mapping, in insertion order.
pub type Record = Map<String, Value>;

/// An incoming scan/paste payload before format detection.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    /// Free text: JSON, pipe or comma delimited, or anything else.
    Text(String),
    /// An already parsed value (e.g. a socket message body).
    Value(Value),
}

impl RawInput {
    /// Returns `true` when the payload carries nothing usable.
    pub fn is_blank(&self) -> bool {
        match self {
            RawInput::Text(text) => text.trim().is_empty(),
            RawInput::Value(Value::Null) => true,
            RawInput::Value(_) => false,
        }
    }
}

impl From<&str> for RawInput {
    fn from(value: &str) -> Self {
        RawInput::Text(value.to_string())
    }
}

impl From<String> for RawInput {
    fn from(value: String) -> Self {
        RawInput::Text(value)
    }
}

impl From<Value> for RawInput {
    fn from(value: Value) -> Self {
        RawInput::Value(value)
    }
}

impl From<Record> for RawInput {
    fn from(value: Record) -> Self {
        RawInput::Value(Value::Object(value))
    }
}

/// Which numbered placeholder slot a fill targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SlotChoice {
    /// The unsuffixed placeholder (`{ho_ten}`).
    #[default]
    Default,
    /// The placeholder suffixed with `_n` (`{ho_ten_n}`).
    Indexed(u32),
}

impl SlotChoice {
    pub fn index(&self) -> Option<u32> {
        match self {
            SlotChoice::Default => None,
            SlotChoice::Indexed(n) => Some(*n),
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, SlotChoice::Default)
    }
}

/// Displays `default` or the bare index.
impl Display for SlotChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotChoice::Default => write!(f, "default"),
            SlotChoice::Indexed(n) => write!(f, "{}", n),
        }
    }
}

/// Accepts `default` (case-insensitive), `2` or `_2`.
///
/// # Example
/// ```rust
/// use docfill::SlotChoice;
/// use std::str::FromStr;
/// assert_eq!(SlotChoice::from_str("default").unwrap(), SlotChoice::Default);
/// assert_eq!(SlotChoice::from_str("_2").unwrap(), SlotChoice::Indexed(2));
/// assert!(SlotChoice::from_str("two").is_err());
/// ```
impl FromStr for SlotChoice {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("default") {
            return Ok(SlotChoice::Default);
        }
        trimmed
            .strip_prefix('_')
            .unwrap_or(trimmed)
            .parse::<u32>()
            .map(SlotChoice::Indexed)
            .map_err(|_| Error::InvalidSlot(s.to_string()))
    }
}

impl Serialize for SlotChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SlotChoice::Default => serializer.serialize_str("default"),
            SlotChoice::Indexed(n) => serializer.serialize_u32(*n),
        }
    }
}

impl<'de> Deserialize<'de> for SlotChoice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Index(u32),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Index(n) => Ok(SlotChoice::Indexed(n)),
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// One semantic field that may appear several times in a template, once per party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderGroup {
    pub base_key: String,
    /// Every placeholder key of the group; the unsuffixed key comes first when present.
    pub variants: Vec<String>,
}

impl PlaceholderGroup {
    pub fn contains(&self, key: &str) -> bool {
        self.base_key == key || self.variants.iter().any(|v| v == key)
    }
}

/// The values currently staged for the open document, keyed by placeholder.
///
/// Immutable: updates produce a new state (see [`crate::merge::merge`]).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FillState {
    values: Record,
}

impl FillState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.values.iter()
    }

    pub fn as_record(&self) -> &Record {
        &self.values
    }

    pub fn into_record(self) -> Record {
        self.values
    }
}

impl From<Record> for FillState {
    fn from(values: Record) -> Self {
        FillState { values }
    }
}

/// Treats `null`, missing and whitespace-only strings as "no value".
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Renders a scalar as the text a template would show.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
