//! Coarse grouping of expense categories
//!
//! Fine-grained categories come straight from the CSV and form an open set.
//! Each one maps to exactly one [`CategoryGroup`]; anything not listed in the
//! table lands in [`CategoryGroup::Other`].

use serde::{Deserialize, Serialize};

/// Coarse bucket for an expense category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoryGroup {
    Housing,
    Food,
    Education,
    Utilities,
    Transportation,
    Personal,
    Other,
}

impl CategoryGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Housing => "Housing",
            Self::Food => "Food",
            Self::Education => "Education",
            Self::Utilities => "Utilities",
            Self::Transportation => "Transportation",
            Self::Personal => "Personal",
            Self::Other => "Other",
        }
    }

    pub fn all() -> &'static [CategoryGroup] {
        &[
            Self::Housing,
            Self::Food,
            Self::Education,
            Self::Utilities,
            Self::Transportation,
            Self::Personal,
            Self::Other,
        ]
    }
}

impl std::str::FromStr for CategoryGroup {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "housing" => Ok(Self::Housing),
            "food" => Ok(Self::Food),
            "education" => Ok(Self::Education),
            "utilities" => Ok(Self::Utilities),
            "transportation" => Ok(Self::Transportation),
            "personal" => Ok(Self::Personal),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown category group: {}", s)),
        }
    }
}

impl std::fmt::Display for CategoryGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category → group table. Two-word categories appear with both the
/// underscore form used in exports and the spaced form used by hand entry.
const CATEGORY_GROUPS: &[(&str, CategoryGroup)] = &[
    ("Rent", CategoryGroup::Housing),
    ("Groceries", CategoryGroup::Food),
    ("Restaurants", CategoryGroup::Food),
    ("Tuition", CategoryGroup::Education),
    ("Books", CategoryGroup::Education),
    ("Mobile_Recharge", CategoryGroup::Utilities),
    ("Mobile Recharge", CategoryGroup::Utilities),
    ("Utilities", CategoryGroup::Utilities),
    ("Gas", CategoryGroup::Transportation),
    ("Travel", CategoryGroup::Transportation),
    ("Car_Insurance", CategoryGroup::Transportation),
    ("Car Insurance", CategoryGroup::Transportation),
    ("Shopping", CategoryGroup::Personal),
];

/// Map a category to its coarse group. Never fails: unknown input is `Other`.
pub fn group_for(category: &str) -> CategoryGroup {
    CATEGORY_GROUPS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, group)| *group)
        .unwrap_or(CategoryGroup::Other)
}
