//! Placeholder grouping utilities.
//!
//! Goals:
//! - Group template keys into a base key plus numbered variants (`ho_ten`, `ho_ten_1`, `ho_ten_2`).
//! - List the slot indices a template offers, for the slot-choice prompt.
//! - Split a key into its base and numeric suffix.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::PlaceholderGroup;

lazy_static! {
    static ref SUFFIX_REGEX: Regex = Regex::new(r"^(.+?)_(\d+)$").unwrap();
}

/// Splits `key` into its base and numeric suffix.
///
/// Keys without a `_<digits>` suffix, and keys that would leave an empty
/// base (`_1`), are returned whole with no index.
///
/// # Example
/// ```rust
/// use docfill::placeholder::split_suffix;
/// assert_eq!(split_suffix("ho_ten_2"), ("ho_ten", Some(2)));
/// assert_eq!(split_suffix("ho_ten"), ("ho_ten", None));
/// assert_eq!(split_suffix("_1"), ("_1", None));
/// ```
pub fn split_suffix(key: &str) -> (&str, Option<u32>) {
    match SUFFIX_REGEX.captures(key) {
        Some(caps) => match caps[2].parse::<u32>() {
            Ok(index) => (caps.get(1).map_or(key, |m| m.as_str()), Some(index)),
            Err(_) => (key, None),
        },
        None => (key, None),
    }
}

/// Groups template placeholder keys by base key.
///
/// Groups appear in the order their first key was encountered. Within a
/// group the unsuffixed key comes first when present, followed by the
/// numbered variants in encounter order. Duplicate keys are ignored, so
/// regrouping a group's own variants yields the same group.
pub fn group_placeholders<I, S>(keys: I) -> Vec<PlaceholderGroup>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups: Vec<PlaceholderGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for key in keys {
        let key = key.as_ref().trim();
        if key.is_empty() {
            continue;
        }
        let (base, index) = split_suffix(key);
        let position = *positions.entry(base.to_string()).or_insert_with(|| {
            groups.push(PlaceholderGroup {
                base_key: base.to_string(),
                variants: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[position];
        if group.variants.iter().any(|v| v == key) {
            continue;
        }
        match index {
            None => group.variants.insert(0, key.to_string()),
            Some(_) => group.variants.push(key.to_string()),
        }
    }

    groups
}

/// The sorted, deduplicated numeric suffixes found across all groups.
pub fn available_slot_indices(groups: &[PlaceholderGroup]) -> Vec<u32> {
    let mut indices: Vec<u32> = groups
        .iter()
        .flat_map(|group| group.variants.iter())
        .filter_map(|variant| split_suffix(variant).1)
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}
