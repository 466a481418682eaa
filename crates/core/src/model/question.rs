use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("question category cannot be empty")]
    EmptyCategory,

    #[error("question needs at least 2 answers, got {len}")]
    NotEnoughAnswers { len: usize },

    #[error("answer option cannot be empty")]
    EmptyAnswer,

    #[error("duplicate answer option: {0}")]
    DuplicateAnswer(String),

    #[error("correct answer is not one of the options")]
    CorrectNotAnOption,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Raw question record as it appears in a bank file, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub text: String,
    pub category: String,
    pub answers: Vec<String>,
    pub correct: String,
}

impl QuestionDraft {
    /// Validate and normalize the draft into an immutable `Question`.
    ///
    /// All fields are trimmed. Answer options form a set: at least two,
    /// no duplicates, and the correct answer must be one of them.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if any field fails validation.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let text = self.text.trim().to_owned();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }

        let category = self.category.trim().to_owned();
        if category.is_empty() {
            return Err(QuestionError::EmptyCategory);
        }

        let mut answers = Vec::with_capacity(self.answers.len());
        for raw in self.answers {
            let answer = raw.trim().to_owned();
            if answer.is_empty() {
                return Err(QuestionError::EmptyAnswer);
            }
            if answers.contains(&answer) {
                return Err(QuestionError::DuplicateAnswer(answer));
            }
            answers.push(answer);
        }
        if answers.len() < 2 {
            return Err(QuestionError::NotEnoughAnswers { len: answers.len() });
        }

        let correct = self.correct.trim().to_owned();
        if !answers.contains(&correct) {
            return Err(QuestionError::CorrectNotAnOption);
        }

        Ok(Question {
            text,
            category,
            answers,
            correct,
        })
    }
}

/// A validated multiple-choice question. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    category: String,
    answers: Vec<String>,
    correct: String,
}

impl Question {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Answer options in bank order. Presentation shuffles these per display.
    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    #[must_use]
    pub fn correct(&self) -> &str {
        &self.correct
    }

    /// Exact string comparison against the correct answer.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct == answer
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            text: "Capital of Senegal?".into(),
            category: "Geography".into(),
            answers: vec!["Dakar".into(), "Abuja".into(), "Accra".into()],
            correct: "Dakar".into(),
        }
    }

    #[test]
    fn valid_draft_passes() {
        let question = draft().validate().unwrap();
        assert_eq!(question.text(), "Capital of Senegal?");
        assert_eq!(question.category(), "Geography");
        assert!(question.is_correct("Dakar"));
        assert!(!question.is_correct("dakar"));
    }

    #[test]
    fn fields_are_trimmed() {
        let mut d = draft();
        d.text = "  Capital of Senegal?  ".into();
        d.correct = " Dakar ".into();
        let question = d.validate().unwrap();
        assert_eq!(question.text(), "Capital of Senegal?");
        assert_eq!(question.correct(), "Dakar");
    }

    #[test]
    fn empty_text_rejected() {
        let mut d = draft();
        d.text = "   ".into();
        assert_eq!(d.validate().unwrap_err(), QuestionError::EmptyText);
    }

    #[test]
    fn single_answer_rejected() {
        let mut d = draft();
        d.answers = vec!["Dakar".into()];
        d.correct = "Dakar".into();
        assert!(matches!(
            d.validate().unwrap_err(),
            QuestionError::NotEnoughAnswers { len: 1 }
        ));
    }

    #[test]
    fn duplicate_answers_rejected() {
        let mut d = draft();
        d.answers = vec!["Dakar".into(), "Dakar ".into()];
        assert!(matches!(
            d.validate().unwrap_err(),
            QuestionError::DuplicateAnswer(_)
        ));
    }

    #[test]
    fn correct_must_be_an_option() {
        let mut d = draft();
        d.correct = "Lagos".into();
        assert_eq!(d.validate().unwrap_err(), QuestionError::CorrectNotAnOption);
    }
}
