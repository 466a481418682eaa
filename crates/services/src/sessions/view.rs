use chrono::{DateTime, Utc};
use rand::rng;
use rand::seq::SliceRandom;
use std::sync::Arc;

use quiz_core::model::{CategoryKey, Leaderboard, PlayerName, ResultTier};
use storage::repository::LeaderboardRepository;

use super::service::QuizSession;
use crate::Clock;
use crate::error::SessionError;

/// Countdown shown next to the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLeft {
    /// Training mode: no timer.
    Untimed,
    Seconds(i64),
}

/// Presentation-agnostic snapshot of the current question.
///
/// This is intentionally **not** a UI view-model: no pre-formatted
/// strings, no layout assumptions. Answer options are re-shuffled on every
/// snapshot so their on-screen order never gives the answer away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub number: usize,
    pub total: usize,
    pub text: String,
    pub category: String,
    pub options: Vec<String>,
    pub time_left: TimeLeft,
}

impl QuestionView {
    /// Snapshot the active question, or `None` once the deck is exhausted.
    #[must_use]
    pub fn from_session(session: &QuizSession, now: DateTime<Utc>) -> Option<Self> {
        let question = session.current_question()?;
        let progress = session.progress();

        let mut options: Vec<String> = question.answers().to_vec();
        let mut rng = rng();
        options.as_mut_slice().shuffle(&mut rng);

        let time_left = match session.remaining_seconds(now) {
            Some(secs) => TimeLeft::Seconds(secs),
            None => TimeLeft::Untimed,
        };

        Some(Self {
            number: progress.question_number,
            total: progress.total,
            text: question.text().to_owned(),
            category: question.category().to_owned(),
            options,
            time_left,
        })
    }
}

/// Everything the results screen needs for a completed session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResults {
    pub player: PlayerName,
    pub category: CategoryKey,
    pub score: u32,
    pub total: u32,
    pub percent: u8,
    pub tier: ResultTier,
    /// Board for the session's category after this session was recorded.
    pub leaderboard: Leaderboard,
}

/// Read-side leaderboard facade that hides repositories and time from the
/// presentation layer.
#[derive(Clone)]
pub struct LeaderboardService {
    clock: Clock,
    leaderboards: Arc<dyn LeaderboardRepository>,
}

impl LeaderboardService {
    #[must_use]
    pub fn new(clock: Clock, leaderboards: Arc<dyn LeaderboardRepository>) -> Self {
        Self {
            clock,
            leaderboards,
        }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(
            clock,
            Arc::new(storage::repository::InMemoryRepository::new()),
        )
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Load the board for a category key.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn board(&self, key: &CategoryKey) -> Result<Leaderboard, SessionError> {
        Ok(self.leaderboards.load_board(key).await?)
    }
}
