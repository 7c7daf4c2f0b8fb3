//! Expense categories and their display color tokens.

use core::convert::Infallible;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use splitledger_core::ValueObject;

/// Color token used for anything outside the known categories.
pub const DEFAULT_CATEGORY_COLOR: &str = "#6B7280";

/// Closed set of expense categories.
///
/// Unknown labels collapse into [`Category::Other`], both when parsing and
/// when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Category {
    FoodAndDining,
    Transportation,
    Groceries,
    Entertainment,
    Utilities,
    Shopping,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::FoodAndDining,
        Category::Transportation,
        Category::Groceries,
        Category::Entertainment,
        Category::Utilities,
        Category::Shopping,
        Category::Other,
    ];

    /// Human-readable label, as shown on expense badges.
    pub fn label(self) -> &'static str {
        match self {
            Category::FoodAndDining => "Food & Dining",
            Category::Transportation => "Transportation",
            Category::Groceries => "Groceries",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Shopping => "Shopping",
            Category::Other => "Other",
        }
    }

    /// Display color token for this category.
    pub fn color(self) -> &'static str {
        match self {
            Category::FoodAndDining => "#F97316",
            Category::Transportation => "#3B82F6",
            Category::Groceries => "#10B981",
            Category::Entertainment => "#8B5CF6",
            Category::Utilities => "#06B6D4",
            Category::Shopping => "#EC4899",
            Category::Other => DEFAULT_CATEGORY_COLOR,
        }
    }

    /// Map a free-form label onto the closed set. Never fails.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| *c != Category::Other && c.label().eq_ignore_ascii_case(label))
            .unwrap_or(Category::Other)
    }
}

impl ValueObject for Category {}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<Category> for &'static str {
    fn from(value: Category) -> Self {
        value.label()
    }
}

impl FromStr for Category {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

/// Color token for a category label; unknown labels get [`DEFAULT_CATEGORY_COLOR`].
pub fn category_color(label: &str) -> &'static str {
    Category::from_label(label).color()
}
