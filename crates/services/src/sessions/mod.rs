mod plan;
mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::{DECK_SIZE_MAX, DeckBuilder, DeckPlan};
pub use progress::SessionProgress;
pub use service::{
    ADVANCE_DELAY_CORRECT, ADVANCE_DELAY_INCORRECT, AdvanceOutcome, AnswerFeedback, AnswerOutcome,
    AnswerRecord, QUESTION_TIME_LIMIT_SECS, QuizSession,
};
pub use view::{LeaderboardService, QuestionView, SessionResults, TimeLeft};
pub use workflow::QuizLoopService;
