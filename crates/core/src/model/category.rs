use std::fmt;

/// Storage key reserved for the "all categories" sentinel. Real category
/// names are trimmed and non-empty, so they can never collide with it.
const ALL_CATEGORIES_KEY: &str = "*";

/// Leaderboard key: a named category, or the sentinel covering sessions
/// played over the whole bank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategoryKey {
    AllCategories,
    Named(String),
}

impl CategoryKey {
    /// Builds a key from a raw category name. Whitespace-only input maps
    /// to the sentinel.
    #[must_use]
    pub fn named(raw: impl Into<String>) -> Self {
        let name = raw.into().trim().to_owned();
        if name.is_empty() {
            Self::AllCategories
        } else {
            Self::Named(name)
        }
    }

    /// The string this key is persisted under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        match self {
            Self::AllCategories => ALL_CATEGORIES_KEY,
            Self::Named(name) => name,
        }
    }

    /// Inverse of [`CategoryKey::storage_key`].
    #[must_use]
    pub fn from_storage_key(key: &str) -> Self {
        if key == ALL_CATEGORIES_KEY {
            Self::AllCategories
        } else {
            Self::named(key)
        }
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllCategories => write!(f, "All categories"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_maps_to_sentinel() {
        assert_eq!(CategoryKey::named("   "), CategoryKey::AllCategories);
    }

    #[test]
    fn storage_key_round_trips() {
        let named = CategoryKey::named("History");
        assert_eq!(CategoryKey::from_storage_key(named.storage_key()), named);

        let all = CategoryKey::AllCategories;
        assert_eq!(CategoryKey::from_storage_key(all.storage_key()), all);
    }

    #[test]
    fn display_uses_readable_sentinel() {
        assert_eq!(CategoryKey::AllCategories.to_string(), "All categories");
        assert_eq!(CategoryKey::named("Music").to_string(), "Music");
    }
}
