//! Field normalization: expands a parsed record so that every recognised
//! alias of a semantic field carries the same value.
//!
//! Templates in the wild use `{hoTen}`, `{ho_ten}`, `{ho_va_ten}` and friends
//! interchangeably; after [`normalize`] any of them resolves.
//!
//! Normalization only ever adds keys. A key that already holds a non-empty
//! value is left alone, and explicit component fields (e.g. `ns_ngay`) win
//! over the parts derived from splitting a full date.

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::{
    dates::{current_date_fields, split_display_date},
    types::{Record, is_blank},
};

/// A semantic field, every key it is known under (canonical alias first),
/// and the keys [`normalize`] derives from its value.
struct AliasFamily {
    aliases: &'static [&'static str],
    derived: &'static [&'static str],
}

const FULL_NAME: AliasFamily = AliasFamily {
    aliases: &["hoTen", "ho_ten", "ten", "hoten", "ho_va_ten"],
    derived: &["ho_ten_upper", "ho_ten_title"],
};
const DATE_OF_BIRTH: AliasFamily = AliasFamily {
    aliases: &["ngaySinh", "ngay_sinh"],
    derived: &[
        "ngay_sinh_full",
        "ns_ngay",
        "ns_thang",
        "ns_nam",
        "ngay",
        "thang",
        "nam",
    ],
};
const CCCD: AliasFamily = AliasFamily {
    aliases: &["cccd", "so_cccd", "so_CCCD"],
    derived: &[],
};
const CMND: AliasFamily = AliasFamily {
    aliases: &["cmnd", "so_cmnd", "so_CMND"],
    derived: &[],
};
const GENDER: AliasFamily = AliasFamily {
    aliases: &["gioiTinh", "gioi_tinh"],
    derived: &[],
};
const ADDRESS: AliasFamily = AliasFamily {
    aliases: &["diaChi", "dia_chi", "noi_cu_tru", "noiCuTru"],
    derived: &["dia_chi_upper"],
};
const ISSUE_DATE: AliasFamily = AliasFamily {
    aliases: &["ngayCap", "ngay_cap"],
    derived: &["nc_ngay", "nc_thang", "nc_nam"],
};

const SIMPLE_FAMILIES: [&AliasFamily; 5] =
    [&FULL_NAME, &DATE_OF_BIRTH, &GENDER, &ADDRESS, &ISSUE_DATE];

const ALL_FAMILIES: [&AliasFamily; 7] = [
    &FULL_NAME,
    &DATE_OF_BIRTH,
    &CCCD,
    &CMND,
    &GENDER,
    &ADDRESS,
    &ISSUE_DATE,
];

/// The keys [`normalize`] writes for the same field as `key`: every alias
/// of its family and the values derived from it, `key` included. Empty when
/// `key` is not a known alias.
///
/// ```rust
/// use docfill::normalize::related_keys;
///
/// let keys = related_keys("ho_ten");
/// assert!(keys.contains(&"hoTen"));
/// assert!(keys.contains(&"ho_ten_upper"));
/// assert!(related_keys("ma_ho_so").is_empty());
/// ```
pub fn related_keys(key: &str) -> Vec<&'static str> {
    ALL_FAMILIES
        .iter()
        .find(|family| family.aliases.iter().any(|alias| *alias == key))
        .map(|family| {
            family
                .aliases
                .iter()
                .chain(family.derived)
                .copied()
                .collect()
        })
        .unwrap_or_default()
}

impl AliasFamily {
    /// First non-empty value across the aliases, in declared order.
    fn value<'a>(&self, record: &'a Record) -> Option<&'a Value> {
        self.aliases
            .iter()
            .map(|alias| record.get(*alias))
            .find(|value| !is_blank(*value))
            .flatten()
    }

    /// Fills every blank alias with `value`.
    fn mirror(&self, record: &mut Record, value: &Value) {
        for alias in self.aliases {
            set_if_blank(record, alias, value.clone());
        }
    }

    fn expand(&self, record: &mut Record) {
        if let Some(value) = self.value(record).cloned() {
            self.mirror(record, &value);
        }
    }
}

fn set_if_blank(record: &mut Record, key: &str, value: Value) {
    if is_blank(record.get(key)) {
        record.insert(key.to_string(), value);
    }
}

/// Derives day/month/year parts from a `DD/MM/YYYY` value under the given keys.
fn derive_date_parts(record: &mut Record, family: &AliasFamily, parts: [&str; 3]) {
    let Some(Value::String(date)) = family.value(record) else {
        return;
    };
    let Some((day, month, year)) = split_display_date(date) else {
        return;
    };
    for (key, part) in parts.iter().zip([day, month, year]) {
        set_if_blank(record, key, Value::String(part));
    }
}

/// Expands `record` so every alias of every known field is present.
///
/// # Example
/// ```rust
/// use docfill::normalize::normalize;
/// use serde_json::json;
///
/// let record = json!({"ho_ten": "Lê Văn C", "ngay_sinh": "02/09/1968"});
/// let normalized = normalize(record.as_object().unwrap());
/// assert_eq!(normalized["hoTen"], "Lê Văn C");
/// assert_eq!(normalized["ho_va_ten"], "Lê Văn C");
/// assert_eq!(normalized["ns_nam"], "1968");
/// ```
pub fn normalize(record: &Record) -> Record {
    let mut out = record.clone();

    for family in SIMPLE_FAMILIES {
        family.expand(&mut out);
    }

    // CCCD and CMND are distinct documents, but a template asking for one
    // should still show the other when only one was scanned.
    let cccd = CCCD.value(&out).cloned();
    let cmnd = CMND.value(&out).cloned();
    match (cccd, cmnd) {
        (Some(cccd), Some(cmnd)) => {
            CCCD.mirror(&mut out, &cccd);
            CMND.mirror(&mut out, &cmnd);
        }
        (Some(id), None) | (None, Some(id)) => {
            CCCD.mirror(&mut out, &id);
            CMND.mirror(&mut out, &id);
        }
        (None, None) => {}
    }

    if let Some(Value::String(dob)) = DATE_OF_BIRTH.value(&out).cloned() {
        set_if_blank(&mut out, "ngay_sinh_full", Value::String(dob));
    }
    derive_date_parts(&mut out, &DATE_OF_BIRTH, ["ns_ngay", "ns_thang", "ns_nam"]);
    derive_date_parts(&mut out, &DATE_OF_BIRTH, ["ngay", "thang", "nam"]);
    derive_date_parts(&mut out, &ISSUE_DATE, ["nc_ngay", "nc_thang", "nc_nam"]);

    if let Some(Value::String(name)) = FULL_NAME.value(&out).cloned() {
        set_if_blank(&mut out, "ho_ten_upper", Value::String(name.to_uppercase()));
        set_if_blank(&mut out, "ho_ten_title", Value::String(title_case(&name)));
    }
    if let Some(Value::String(address)) = ADDRESS.value(&out).cloned() {
        set_if_blank(&mut out, "dia_chi_upper", Value::String(address.to_uppercase()));
    }

    out
}

/// [`normalize`] plus the current date/time convenience fields a rendered document needs.
pub fn prepare_for_render(record: &Record, now: NaiveDateTime) -> Record {
    let mut out = normalize(record);
    for (key, value) in current_date_fields(now) {
        set_if_blank(&mut out, key, Value::String(value));
    }
    out
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
