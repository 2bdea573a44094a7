use serde::{Deserialize, Serialize};

/// Reference data describing how a category is displayed. Transactions and budgets refer to a
/// category by `name`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
}

impl Category {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        color: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            icon: icon.into(),
        }
    }
}

/// The color used for any category name that has no entry.
pub const FALLBACK_COLOR: &str = "#85929E";

/// The built-in categories as `(id, name, color, icon)`.
pub const DEFAULT_CATEGORIES: [(&str, &str, &str, &str); 10] = [
    ("1", "Food & Dining", "#FF6B6B", "utensils"),
    ("2", "Transportation", "#4ECDC4", "car"),
    ("3", "Shopping", "#45B7D1", "shopping-bag"),
    ("4", "Entertainment", "#96CEB4", "film"),
    ("5", "Bills & Utilities", "#FFEAA7", "receipt"),
    ("6", "Healthcare", "#DDA0DD", "heart"),
    ("7", "Education", "#98D8C8", "book"),
    ("8", "Travel", "#F7DC6F", "plane"),
    ("9", "Income", "#58D68D", "dollar-sign"),
    ("10", "Other", FALLBACK_COLOR, "more-horizontal"),
];

/// Returns the built-in categories as owned values.
pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(id, name, color, icon)| Category::new(*id, *name, *color, *icon))
        .collect()
}
