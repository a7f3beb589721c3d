//! Fill merger: joins a normalized record with the template's placeholder
//! groups and the current slot choice, producing the next [`FillState`].
//!
//! Precedence, lowest first: prior state, global fields, group updates.
//! A key the new record has no value for keeps its prior value. Record keys
//! that belong to a group, either directly or as an alias or derived value
//! of the group's field, are never copied as globals.

use serde::Serialize;
use serde_json::Value;

use crate::{
    normalize::related_keys,
    slot::{resolve, suffixed_key},
    types::{FillState, PlaceholderGroup, Record, SlotChoice},
};

/// How unresolved targets are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// Missing values leave the prior state untouched.
    #[default]
    Normal,
    /// Previews what remains unfilled: a target never filled before and
    /// without a value is written as its own `{key}` token.
    RestrictToSelection,
}

/// Options for [`merge`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeOptions {
    /// On a numbered fill, drop the value held under the unsuffixed base key.
    pub cleanup_base_on_numbered_fill: bool,
    pub mode: MergeMode,
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables/disables base key cleanup on numbered fills.
    pub fn with_cleanup_base_on_numbered_fill(mut self, cleanup: bool) -> Self {
        self.cleanup_base_on_numbered_fill = cleanup;
        self
    }

    pub fn with_mode(mut self, mode: MergeMode) -> Self {
        self.mode = mode;
        self
    }
}

/// What a merge wrote, for logging and for the session listeners.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MergeReport {
    /// Target keys written from a placeholder group.
    pub updated: Vec<String>,
    /// Record keys copied as globals (not related to any group).
    pub globals: Vec<String>,
    /// Base keys removed by cleanup.
    pub cleaned: Vec<String>,
    /// Target keys with no value in the record.
    pub unresolved: Vec<String>,
}

impl MergeReport {
    /// Number of keys that changed or were added.
    pub fn changed(&self) -> usize {
        self.updated.len() + self.globals.len() + self.cleaned.len()
    }
}

/// Merges `record` into `prior`. See [`merge_with_report`].
pub fn merge(
    prior: &FillState,
    record: &Record,
    groups: &[PlaceholderGroup],
    choice: SlotChoice,
    options: &MergeOptions,
) -> FillState {
    merge_with_report(prior, record, groups, choice, options).0
}

/// Merges `record` into `prior` and reports what was written.
///
/// # Example
/// ```rust
/// use docfill::{FillState, SlotChoice, placeholder::group_placeholders};
/// use docfill::merge::{MergeOptions, merge};
/// use serde_json::json;
///
/// let groups = group_placeholders(["ho_ten", "ho_ten_1", "dia_chi"]);
/// let prior = FillState::from(json!({"dia_chi": "old"}).as_object().unwrap().clone());
/// let record = json!({"ho_ten": "Nguyễn Văn A"}).as_object().unwrap().clone();
///
/// let next = merge(&prior, &record, &groups, SlotChoice::Indexed(1), &MergeOptions::new());
/// assert_eq!(next.get("ho_ten_1"), Some(&json!("Nguyễn Văn A")));
/// assert_eq!(next.get("dia_chi"), Some(&json!("old")));
/// ```
pub fn merge_with_report(
    prior: &FillState,
    record: &Record,
    groups: &[PlaceholderGroup],
    choice: SlotChoice,
    options: &MergeOptions,
) -> (FillState, MergeReport) {
    let mut report = MergeReport::default();
    let mut group_updates: Vec<(String, Value)> = Vec::new();

    for group in groups {
        let target = resolve(group, choice);
        match lookup(record, group, choice) {
            Some(value) => {
                group_updates.push((target.clone(), value.clone()));
                report.updated.push(target.clone());
                if options.cleanup_base_on_numbered_fill
                    && !choice.is_default()
                    && group.base_key != target
                    && !report.cleaned.contains(&group.base_key)
                {
                    report.cleaned.push(group.base_key.clone());
                }
            }
            None => {
                if options.mode == MergeMode::RestrictToSelection && !prior.contains_key(&target) {
                    group_updates.push((target.clone(), Value::String(format!("{{{}}}", target))));
                }
                report.unresolved.push(target);
            }
        }
    }

    let mut next = prior.as_record().clone();

    for (key, value) in record {
        if value.is_null() || groups.iter().any(|group| group_owns(group, key)) {
            continue;
        }
        next.insert(key.clone(), value.clone());
        report.globals.push(key.clone());
    }

    for base in &report.cleaned {
        next.remove(base);
    }

    for (key, value) in group_updates {
        next.insert(key, value);
    }

    // A base key that is also another group's written target stays.
    report
        .cleaned
        .retain(|base| !report.updated.contains(base));

    log::debug!(
        "merged fill: {} group update(s), {} global(s), {} cleaned, {} unresolved",
        report.updated.len(),
        report.globals.len(),
        report.cleaned.len(),
        report.unresolved.len()
    );
    (FillState::from(next), report)
}

/// First present value for `group`: the exact suffixed key, the base, then each variant.
fn lookup<'a>(
    record: &'a Record,
    group: &PlaceholderGroup,
    choice: SlotChoice,
) -> Option<&'a Value> {
    let suffixed = choice.index().map(|n| suffixed_key(&group.base_key, n));
    suffixed
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(group.base_key.as_str()))
        .chain(group.variants.iter().map(String::as_str))
        .filter_map(|key| record.get(key))
        .find(|value| !value.is_null())
}

fn group_owns(group: &PlaceholderGroup, key: &str) -> bool {
    group.base_key == key
        || group.contains(key)
        || related_keys(&group.base_key).iter().any(|related| *related == key)
}
