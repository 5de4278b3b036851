//! Opaque selector strings addressing elements on the UI surface.
//!
//! The selector syntax is owned by the UI surface, not by this crate: a
//! selector is carried as an opaque value, compared and composed at the
//! string level, and never parsed here.

use serde::{Deserialize, Serialize};

/// Opaque address of zero-or-more elements on the UI surface.
///
/// Composition is string-level descendant scoping:
///
/// ```
/// use pilotar::Selector;
///
/// let tab = Selector::new(".meat-tab.visible");
/// let action = tab.within(".main-action");
/// assert_eq!(action.as_str(), ".meat-tab.visible .main-action");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector(String);

impl Selector {
    /// Create a selector from any string-like value.
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    /// The raw selector string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Scope `descendant` under this selector.
    ///
    /// Pure string concatenation with a single separating space; no syntax
    /// is assumed beyond what the UI surface gives descendant combinators.
    #[must_use]
    pub fn within(&self, descendant: impl AsRef<str>) -> Self {
        Self(format!("{} {}", self.0, descendant.as_ref()))
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Selector {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Selector {
    fn from(selector: &str) -> Self {
        Self(selector.to_string())
    }
}

impl From<String> for Selector {
    fn from(selector: String) -> Self {
        Self(selector)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_selector_equality_is_string_level() {
        assert_eq!(Selector::new("#search"), Selector::from("#search"));
        assert_ne!(Selector::new("#search"), Selector::new("#search "));
    }

    #[test]
    fn test_selector_display() {
        let selector = Selector::new(".main-action[data-game-id='149766']");
        assert_eq!(
            selector.to_string(),
            ".main-action[data-game-id='149766']"
        );
    }

    #[test]
    fn test_within_scopes_descendant() {
        let row = Selector::new(".table--row").within(".open-game-in-tab");
        assert_eq!(row.as_str(), ".table--row .open-game-in-tab");
    }

    #[test]
    fn test_within_accepts_selector_and_str() {
        let base = Selector::new("#sidebar");
        let a = base.within("section");
        let b = base.within(Selector::new("section"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_serde_transparent() {
        let selector = Selector::new("#modal-force-close");
        let json = serde_json::to_string(&selector).unwrap();
        assert_eq!(json, "\"#modal-force-close\"");
        let back: Selector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, selector);
    }

    proptest! {
        #[test]
        fn prop_within_is_concatenation(parent in "[a-z#.\\-]{1,16}", child in "[a-z#.\\-]{1,16}") {
            let composed = Selector::new(parent.clone()).within(child.as_str());
            prop_assert_eq!(composed.as_str(), format!("{parent} {child}"));
        }

        #[test]
        fn prop_round_trips_arbitrary_strings(raw in ".{0,64}") {
            let selector = Selector::new(raw.clone());
            prop_assert_eq!(selector.as_str(), raw.as_str());
        }
    }
}
