use rand::rng;
use rand::seq::SliceRandom;

use quiz_core::model::{CategoryKey, Question, QuestionBank};

/// Maximum questions dealt into one session deck.
pub const DECK_SIZE_MAX: usize = 10;

/// Selection result for a session build.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckPlan {
    pub questions: Vec<Question>,
    /// Key the session's leaderboard entry will be recorded under.
    pub category: CategoryKey,
    /// True when a requested category matched nothing and the full bank
    /// was used instead.
    pub used_full_bank_fallback: bool,
}

impl DeckPlan {
    /// Total number of questions in this plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Returns true when no questions were selected for this session.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Builds a session deck by sampling the bank without replacement.
pub struct DeckBuilder<'a> {
    bank: &'a QuestionBank,
    size_cap: usize,
}

impl<'a> DeckBuilder<'a> {
    #[must_use]
    pub fn new(bank: &'a QuestionBank) -> Self {
        Self {
            bank,
            size_cap: DECK_SIZE_MAX,
        }
    }

    /// Override the deck size cap (tests and smaller game variants).
    #[must_use]
    pub fn with_size_cap(mut self, cap: usize) -> Self {
        self.size_cap = cap;
        self
    }

    /// Build a deck plan, optionally filtered to one category.
    ///
    /// A filter that matches nothing falls back to the full bank rather
    /// than erroring; an empty bank produces an empty plan. Questions are
    /// shuffled and truncated to the cap.
    #[must_use]
    pub fn build(self, category_filter: Option<&str>) -> DeckPlan {
        let filter = category_filter.map(str::trim).filter(|f| !f.is_empty());

        let (mut questions, category, used_full_bank_fallback) = match filter {
            Some(name) => {
                let matched: Vec<Question> = self.bank.in_category(name).cloned().collect();
                if matched.is_empty() {
                    tracing::warn!(category = name, "no questions in category, using full bank");
                    (
                        self.bank.questions().to_vec(),
                        CategoryKey::AllCategories,
                        true,
                    )
                } else {
                    (matched, CategoryKey::named(name), false)
                }
            }
            None => (
                self.bank.questions().to_vec(),
                CategoryKey::AllCategories,
                false,
            ),
        };

        let mut rng = rng();
        questions.as_mut_slice().shuffle(&mut rng);
        questions.truncate(self.size_cap);

        DeckPlan {
            questions,
            category,
            used_full_bank_fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionDraft;

    fn question(text: &str, category: &str) -> Question {
        QuestionDraft {
            text: text.into(),
            category: category.into(),
            answers: vec!["A".into(), "B".into()],
            correct: "A".into(),
        }
        .validate()
        .unwrap()
    }

    fn bank(history: u32, music: u32) -> QuestionBank {
        let mut questions = Vec::new();
        for i in 0..history {
            questions.push(question(&format!("h{i}"), "History"));
        }
        for i in 0..music {
            questions.push(question(&format!("m{i}"), "Music"));
        }
        QuestionBank::new(questions)
    }

    #[test]
    fn filter_selects_exactly_the_category() {
        let bank = bank(3, 5);
        let plan = DeckBuilder::new(&bank).build(Some("History"));

        assert_eq!(plan.len(), 3);
        assert!(plan.questions.iter().all(|q| q.category() == "History"));
        assert_eq!(plan.category, CategoryKey::named("History"));
        assert!(!plan.used_full_bank_fallback);
    }

    #[test]
    fn unmatched_filter_falls_back_to_full_bank() {
        let bank = bank(2, 2);
        let plan = DeckBuilder::new(&bank).build(Some("Sports"));

        assert_eq!(plan.len(), 4);
        assert_eq!(plan.category, CategoryKey::AllCategories);
        assert!(plan.used_full_bank_fallback);
    }

    #[test]
    fn blank_filter_means_full_bank() {
        let bank = bank(2, 2);
        let plan = DeckBuilder::new(&bank).build(Some("   "));

        assert_eq!(plan.len(), 4);
        assert!(!plan.used_full_bank_fallback);
    }

    #[test]
    fn deck_never_exceeds_the_cap() {
        let bank = bank(30, 0);
        let plan = DeckBuilder::new(&bank).build(None);
        assert_eq!(plan.len(), DECK_SIZE_MAX);

        let small = DeckBuilder::new(&bank).with_size_cap(3).build(None);
        assert_eq!(small.len(), 3);
    }

    #[test]
    fn sampling_is_without_replacement() {
        let bank = bank(30, 0);
        let plan = DeckBuilder::new(&bank).build(None);

        let mut texts: Vec<_> = plan.questions.iter().map(Question::text).collect();
        texts.sort_unstable();
        texts.dedup();
        assert_eq!(texts.len(), plan.len());
    }

    #[test]
    fn empty_bank_builds_empty_plan() {
        let bank = QuestionBank::default();
        let plan = DeckBuilder::new(&bank).build(None);
        assert!(plan.is_empty());
        assert!(!plan.used_full_bank_fallback);
    }
}
