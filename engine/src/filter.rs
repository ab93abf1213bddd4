//! Filter kinds for querying the collection.

use crate::Item;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Predicate over the completed flag of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every item, in stored order
    #[default]
    All,
    /// Items not yet completed
    Active,
    /// Completed items
    Completed,
}

impl Filter {
    /// Resolve a filter by name.
    ///
    /// Unrecognized names fall back to [`Filter::All`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "active" => Filter::Active,
            "completed" => Filter::Completed,
            _ => Filter::All,
        }
    }

    /// Resolve a filter from a location hash such as `#/active`.
    pub fn from_route(route: &str) -> Self {
        let name = route.strip_prefix('#').unwrap_or(route);
        let name = name.strip_prefix('/').unwrap_or(name);
        Self::from_name(name)
    }

    /// Canonical name of the filter.
    pub fn name(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }

    /// Check whether an item passes this filter.
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !item.completed,
            Filter::Completed => item.completed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for Filter {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names() {
        assert_eq!(Filter::from_name("all"), Filter::All);
        assert_eq!(Filter::from_name("active"), Filter::Active);
        assert_eq!(Filter::from_name("completed"), Filter::Completed);
    }

    #[test]
    fn unknown_names_fall_back_to_all() {
        assert_eq!(Filter::from_name(""), Filter::All);
        assert_eq!(Filter::from_name("Active"), Filter::All);
        assert_eq!(Filter::from_name("done"), Filter::All);
    }

    #[test]
    fn routes() {
        assert_eq!(Filter::from_route("#/active"), Filter::Active);
        assert_eq!(Filter::from_route("#/completed"), Filter::Completed);
        assert_eq!(Filter::from_route("#/"), Filter::All);
        assert_eq!(Filter::from_route(""), Filter::All);
        assert_eq!(Filter::from_route("completed"), Filter::Completed);
    }

    #[test]
    fn display_matches_name() {
        for filter in [Filter::All, Filter::Active, Filter::Completed] {
            assert_eq!(filter.to_string(), filter.name());
            assert_eq!(Filter::from_name(filter.name()), filter);
        }
    }

    #[test]
    fn matches_completed_flag() {
        let mut item = Item::with_id("1", "x");
        assert!(Filter::All.matches(&item));
        assert!(Filter::Active.matches(&item));
        assert!(!Filter::Completed.matches(&item));

        item.completed = true;
        assert!(Filter::All.matches(&item));
        assert!(!Filter::Active.matches(&item));
        assert!(Filter::Completed.matches(&item));
    }
}
