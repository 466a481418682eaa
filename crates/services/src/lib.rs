#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;

pub use quiz_core::Clock;

pub use error::SessionError;
pub use sessions::{
    ADVANCE_DELAY_CORRECT, ADVANCE_DELAY_INCORRECT, AdvanceOutcome, AnswerFeedback, AnswerOutcome,
    DECK_SIZE_MAX, DeckBuilder, DeckPlan, LeaderboardService, QUESTION_TIME_LIMIT_SECS,
    QuestionView, QuizLoopService, QuizSession, SessionProgress, SessionResults, TimeLeft,
};
