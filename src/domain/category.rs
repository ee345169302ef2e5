use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    Income,
    Expense,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKind::Income => f.write_str("Income"),
            CategoryKind::Expense => f.write_str("Expense"),
        }
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            other => Err(format!("unknown category type `{other}`")),
        }
    }
}

/// Categories are keyed by name; transactions reference them by that name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub kind: CategoryKind,
    #[serde(default)]
    pub icon: String,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: CategoryKind, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            icon: icon.into(),
        }
    }

    pub fn defaults() -> Vec<Category> {
        const INCOME: [(&str, &str); 3] = [("Income", "💰"), ("Salary", "💼"), ("Projects", "🚀")];
        const EXPENSE: [(&str, &str); 7] = [
            ("Infrastructure", "🖥"),
            ("Food", "🍔"),
            ("Rent", "🏠"),
            ("Transport", "🚗"),
            ("Entertainment", "🎮"),
            ("Health", "💊"),
            ("Other", "📦"),
        ];
        INCOME
            .iter()
            .map(|(name, icon)| Category::new(*name, CategoryKind::Income, *icon))
            .chain(
                EXPENSE
                    .iter()
                    .map(|(name, icon)| Category::new(*name, CategoryKind::Expense, *icon)),
            )
            .collect()
    }
}
