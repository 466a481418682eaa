use std::fmt;

use serde::{Deserialize, Serialize};

/// Name used when the player leaves the name field blank.
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Player display name. Trimmed; blank input falls back to the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerName(String);

impl PlayerName {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        let name = raw.into().trim().to_owned();
        if name.is_empty() {
            Self(DEFAULT_PLAYER_NAME.to_owned())
        } else {
            Self(name)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PlayerName {
    fn default() -> Self {
        Self(DEFAULT_PLAYER_NAME.to_owned())
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_input() {
        assert_eq!(PlayerName::new("  Awa  ").as_str(), "Awa");
    }

    #[test]
    fn blank_falls_back_to_default() {
        assert_eq!(PlayerName::new("   ").as_str(), DEFAULT_PLAYER_NAME);
        assert_eq!(PlayerName::default().as_str(), DEFAULT_PLAYER_NAME);
    }
}
