/// Result tier derived from the final score percentage.
///
/// Thresholds are fixed: 100% → `Expert`, ≥70% → `Excellent`,
/// ≥40% → `Good`, below → `Encouragement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTier {
    Expert,
    Excellent,
    Good,
    Encouragement,
}

impl ResultTier {
    #[must_use]
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            100.. => Self::Expert,
            70..=99 => Self::Excellent,
            40..=69 => Self::Good,
            _ => Self::Encouragement,
        }
    }

    /// Message shown on the results screen.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Expert => "Perfect! You are an absolute expert!",
            Self::Excellent => "Excellent! A very strong score.",
            Self::Good => "Well done! Keep making progress.",
            Self::Encouragement => "Keep at it! Practice makes perfect.",
        }
    }

    /// Achievement badge label.
    #[must_use]
    pub fn badge(&self) -> &'static str {
        match self {
            Self::Expert => "Absolute Expert",
            Self::Excellent => "Quiz Master",
            Self::Good => "Motivated Apprentice",
            Self::Encouragement => "Curious Explorer",
        }
    }
}
