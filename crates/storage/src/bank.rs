use std::path::Path;

use quiz_core::model::{Question, QuestionBank, QuestionDraft, QuestionError};
use thiserror::Error;

/// Errors raised while loading the question bank.
///
/// Bank loading is one-shot at startup: any of these is terminal for
/// starting sessions and must be surfaced to the user.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankLoadError {
    #[error("failed to read question bank: {0}")]
    Io(#[from] std::io::Error),

    #[error("question bank is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid question at index {index}: {source}")]
    Invalid {
        index: usize,
        source: QuestionError,
    },
}

/// Load and validate a question bank from a JSON file.
///
/// # Errors
///
/// Returns `BankLoadError` on I/O, parse, or validation failure.
pub fn load_bank(path: &Path) -> Result<QuestionBank, BankLoadError> {
    let raw = std::fs::read_to_string(path)?;
    parse_bank(&raw)
}

/// Parse and validate a question bank from raw JSON.
///
/// The expected shape is an array of records:
/// `[{ "text", "category", "answers": [..], "correct" }, ..]`.
///
/// # Errors
///
/// Returns `BankLoadError` on parse or validation failure.
pub fn parse_bank(raw: &str) -> Result<QuestionBank, BankLoadError> {
    let drafts: Vec<QuestionDraft> = serde_json::from_str(raw)?;

    let mut questions: Vec<Question> = Vec::with_capacity(drafts.len());
    for (index, draft) in drafts.into_iter().enumerate() {
        let question = draft
            .validate()
            .map_err(|source| BankLoadError::Invalid { index, source })?;
        questions.push(question);
    }

    tracing::info!(count = questions.len(), "question bank loaded");
    Ok(QuestionBank::new(questions))
}
