use serde::{Deserialize, Serialize};
use std::fmt;

/// Document id assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub String);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maintenance category. Subcategories are plain names, addressed by exact match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

impl Category {
    pub fn has_subcategory(&self, name: &str) -> bool {
        self.subcategories.iter().any(|existing| existing == name)
    }

    pub(crate) fn sort_key(&self) -> String {
        self.name.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Stable sort on the lower-cased name.
pub fn sort_categories(categories: &mut [Category], order: SortOrder) {
    match order {
        SortOrder::Ascending => categories.sort_by_cached_key(Category::sort_key),
        SortOrder::Descending => categories.sort_by(|a, b| b.sort_key().cmp(&a.sort_key())),
    }
}
