//! Per-run enabled state of every [`Category`].

use tracing::warn;

use crate::types::{Category, CategoryDefault};

/// Immutable set of enabled categories, built once before validation starts.
///
/// Backed by a fixed-size array indexed by [`Category`], so it is `Copy` and
/// can be shared by every worker without synchronization.
///
/// # Examples
///
/// ```
/// use spec_validator_core::{Category, CategorySet};
///
/// let defaults = CategorySet::defaults();
/// assert!(defaults.is_enabled(Category::IncorrectSchemaVersion));
/// assert!(!defaults.is_enabled(Category::SchemaValidationFailed));
///
/// let selected = CategorySet::from_selection(Some(&["SchemaValidationFailed"][..]));
/// assert!(selected.is_enabled(Category::SchemaValidationFailed));
/// assert!(!selected.is_enabled(Category::IncorrectSchemaVersion));
/// assert!(selected.is_enabled(Category::DocumentLoadFailed));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySet {
    enabled: [bool; Category::COUNT],
}

impl CategorySet {
    /// Built-in defaults: forced-on and default-on categories.
    pub fn defaults() -> Self {
        Self::from_selection::<&str>(None)
    }

    /// Builds the set from an optional caller-supplied list.
    ///
    /// `None` activates the built-in defaults. `Some(list)` enables the
    /// forced-on categories plus every listed one. Unknown names are ignored.
    pub fn from_selection<S: AsRef<str>>(selection: Option<&[S]>) -> Self {
        let mut enabled = [false; Category::COUNT];

        for category in Category::ALL {
            enabled[category.index()] = match category.default_state() {
                CategoryDefault::Always => true,
                CategoryDefault::Enabled => selection.is_none(),
                CategoryDefault::Disabled => false,
            };
        }

        for name in selection.unwrap_or_default() {
            match name.as_ref().parse::<Category>() {
                Ok(category) => enabled[category.index()] = true,
                Err(err) => warn!(error = %err, "ignoring category"),
            }
        }

        Self { enabled }
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        self.enabled[category.index()]
    }

    /// Enabled categories in declaration order.
    pub fn enabled(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL
            .into_iter()
            .filter(|category| self.is_enabled(*category))
    }

    /// Every category with its enabled flag.
    pub fn states(&self) -> impl Iterator<Item = (Category, bool)> + '_ {
        Category::ALL
            .into_iter()
            .map(|category| (category, self.is_enabled(category)))
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_defaults_leave_schema_validation_off() {
        let set = CategorySet::defaults();
        let enabled: Vec<Category> = set.enabled().collect();
        assert_eq!(
            enabled,
            vec![
                Category::IncorrectSchemaVersion,
                Category::PreviewSchemaWithoutPreviewVersion,
                Category::StableSchemaWithPreviewVersion,
                Category::ListOperationUsingPost,
                Category::DocumentLoadFailed,
                Category::InvalidSourcePath,
            ]
        );
    }

    #[test]
    fn test_empty_selection_keeps_only_forced_categories() {
        let set = CategorySet::from_selection::<String>(Some(&[][..]));
        let enabled: Vec<Category> = set.enabled().collect();
        assert_eq!(
            enabled,
            vec![Category::DocumentLoadFailed, Category::InvalidSourcePath]
        );
    }

    #[test]
    fn test_unknown_names_have_no_effect() {
        let set = CategorySet::from_selection(Some(&["NoSuchCategory", "ListOperationUsingPost"][..]));
        assert!(set.is_enabled(Category::ListOperationUsingPost));
        assert!(!set.is_enabled(Category::IncorrectSchemaVersion));
    }

    #[test]
    fn test_states_cover_every_category() {
        assert_eq!(CategorySet::defaults().states().count(), Category::COUNT);
    }

    fn category_name() -> impl Strategy<Value = String> {
        prop_oneof![
            prop::sample::select(Category::ALL.to_vec()).prop_map(|c| c.to_string()),
            "[A-Za-z]{0,24}",
        ]
    }

    proptest! {
        #[test]
        fn prop_forced_categories_always_enabled(
            names in prop::collection::vec(category_name(), 0..8),
            supplied in any::<bool>(),
        ) {
            let set = if supplied {
                CategorySet::from_selection(Some(names.as_slice()))
            } else {
                CategorySet::from_selection::<String>(None)
            };
            for category in Category::ALL {
                if category.default_state() == CategoryDefault::Always {
                    prop_assert!(set.is_enabled(category));
                }
            }
        }

        #[test]
        fn prop_listed_categories_are_enabled(
            names in prop::collection::vec(category_name(), 0..8),
        ) {
            let set = CategorySet::from_selection(Some(names.as_slice()));
            for category in Category::ALL {
                let listed = names.iter().any(|n| n == category.as_str());
                let forced = category.default_state() == CategoryDefault::Always;
                prop_assert_eq!(set.is_enabled(category), listed || forced);
            }
        }
    }
}
