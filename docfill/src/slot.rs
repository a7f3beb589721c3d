//! Slot selection: which numbered placeholder variant a fill writes to.
//!
//! The selector is a two-state machine, `Default` or `Indexed(n)`. It only
//! moves on an explicit user choice, and falls back to `Default` when a new
//! template is opened or when the template offers no numbered slots.

use crate::{
    placeholder::split_suffix,
    types::{PlaceholderGroup, SlotChoice},
};

/// Resolves the placeholder key a fill should write for `group` under `choice`.
///
/// - `Default`: the unsuffixed key, else the base key, else the first variant.
/// - `Indexed(n)`: `{base}_{n}` if the template has it, else the variant whose
///   numeric suffix equals `n` (e.g. `ho_ten_01`), else the synthesized
///   `{base}_{n}`. Writing to a key the template lacks is harmless.
///
/// # Example
/// ```rust
/// use docfill::{PlaceholderGroup, SlotChoice, slot::resolve};
/// let group = PlaceholderGroup {
///     base_key: "ho_ten".to_string(),
///     variants: vec!["ho_ten".to_string(), "ho_ten_1".to_string(), "ho_ten_2".to_string()],
/// };
/// assert_eq!(resolve(&group, SlotChoice::Indexed(1)), "ho_ten_1");
/// assert_eq!(resolve(&group, SlotChoice::Default), "ho_ten");
/// ```
pub fn resolve(group: &PlaceholderGroup, choice: SlotChoice) -> String {
    match choice {
        SlotChoice::Default => {
            if group.base_key.is_empty() {
                group.variants.first().cloned().unwrap_or_default()
            } else {
                group.base_key.clone()
            }
        }
        SlotChoice::Indexed(n) => {
            let exact = suffixed_key(&group.base_key, n);
            if group.variants.contains(&exact) {
                return exact;
            }
            group
                .variants
                .iter()
                .find(|variant| split_suffix(variant).1 == Some(n))
                .cloned()
                .unwrap_or(exact)
        }
    }
}

/// `{base}_{n}`.
pub fn suffixed_key(base: &str, index: u32) -> String {
    format!("{}_{}", base, index)
}

/// Holds the user's current slot choice for the open editor session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotSelector {
    current: SlotChoice,
    explicit: bool,
}

impl SlotSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> SlotChoice {
        self.current
    }

    /// Whether the current choice came from the user rather than the default.
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Records an explicit user choice.
    pub fn choose(&mut self, choice: SlotChoice) {
        log::info!("slot chosen: {}", choice);
        self.current = choice;
        self.explicit = true;
    }

    /// Back to `Default`, as when a new template is opened or the editor closes.
    pub fn reset(&mut self) {
        self.current = SlotChoice::Default;
        self.explicit = false;
    }

    /// Reacts to a recomputed set of available indices.
    ///
    /// Returns `true` when the selector was reset because no numbered slots remain.
    pub fn sync_with_indices(&mut self, indices: &[u32]) -> bool {
        if indices.is_empty() && (self.current != SlotChoice::Default || self.explicit) {
            self.reset();
            return true;
        }
        false
    }

    pub fn resolve(&self, group: &PlaceholderGroup) -> String {
        resolve(group, self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(base: &str, variants: &[&str]) -> PlaceholderGroup {
        PlaceholderGroup {
            base_key: base.to_string(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn test_resolve_default() {
        let g = group("ho_ten", &["ho_ten", "ho_ten_1"]);
        assert_eq!(resolve(&g, SlotChoice::Default), "ho_ten");
        let g = group("ho_ten", &["ho_ten_1", "ho_ten_2"]);
        assert_eq!(resolve(&g, SlotChoice::Default), "ho_ten");
    }

    #[test]
    fn test_resolve_indexed_exact() {
        let g = group("so_cccd", &["so_cccd", "so_cccd_1", "so_cccd_2"]);
        assert_eq!(resolve(&g, SlotChoice::Indexed(2)), "so_cccd_2");
    }

    #[test]
    fn test_resolve_indexed_by_numeric_suffix() {
        let g = group("ho_ten", &["ho_ten_01", "ho_ten_02"]);
        assert_eq!(resolve(&g, SlotChoice::Indexed(2)), "ho_ten_02");
    }

    #[test]
    fn test_resolve_indexed_synthesized() {
        let g = group("dia_chi", &["dia_chi"]);
        assert_eq!(resolve(&g, SlotChoice::Indexed(3)), "dia_chi_3");
    }

    #[test]
    fn test_selector_transitions() {
        let mut selector = SlotSelector::new();
        assert_eq!(selector.current(), SlotChoice::Default);
        assert!(!selector.is_explicit());

        selector.choose(SlotChoice::Indexed(2));
        assert_eq!(selector.current(), SlotChoice::Indexed(2));
        assert!(selector.is_explicit());
        assert!(!selector.sync_with_indices(&[1, 2]));
        assert_eq!(selector.current(), SlotChoice::Indexed(2));

        assert!(selector.sync_with_indices(&[]));
        assert_eq!(selector.current(), SlotChoice::Default);
        assert!(!selector.is_explicit());
        assert!(!selector.sync_with_indices(&[]));
    }

    #[test]
    fn test_selector_resolve_uses_current_choice() {
        let mut selector = SlotSelector::new();
        let g = group("ho_ten", &["ho_ten", "ho_ten_1"]);
        assert_eq!(selector.resolve(&g), "ho_ten");
        selector.choose(SlotChoice::Indexed(1));
        assert_eq!(selector.resolve(&g), "ho_ten_1");
        selector.reset();
        assert_eq!(selector.resolve(&g), "ho_ten");
    }
}
