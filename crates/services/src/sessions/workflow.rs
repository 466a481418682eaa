use chrono::{DateTime, Utc};
use std::sync::Arc;

use quiz_core::model::{LeaderboardEntry, PlayerName, QuestionBank};
use storage::repository::{LeaderboardRepository, PlayerProfileRepository};

use super::plan::DeckBuilder;
use super::service::{AdvanceOutcome, QuizSession};
use super::view::SessionResults;
use crate::Clock;
use crate::error::SessionError;

/// Orchestrates session start, persisted leaderboards, and the player
/// profile.
///
/// Owns the time source and the repositories; the pure per-question moves
/// (`submit_answer`, `expire_current`) stay on [`QuizSession`] itself.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    bank: Arc<QuestionBank>,
    leaderboards: Arc<dyn LeaderboardRepository>,
    players: Arc<dyn PlayerProfileRepository>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        bank: Arc<QuestionBank>,
        leaderboards: Arc<dyn LeaderboardRepository>,
        players: Arc<dyn PlayerProfileRepository>,
    ) -> Self {
        Self {
            clock,
            bank,
            leaderboards,
            players,
        }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// The saved player name, or the default when none was ever stored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn player_name(&self) -> Result<PlayerName, SessionError> {
        Ok(self
            .players
            .load_player_name()
            .await?
            .unwrap_or_default())
    }

    /// Persist the player name used to prefill future sessions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn set_player_name(&self, raw: &str) -> Result<PlayerName, SessionError> {
        let name = PlayerName::new(raw);
        self.players.save_player_name(&name).await?;
        Ok(name)
    }

    /// Start a new session, optionally filtered to one category.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the player profile cannot be
    /// read. An empty bank is not an error: the session starts completed.
    pub async fn start_session(
        &self,
        category_filter: Option<&str>,
        training: bool,
    ) -> Result<QuizSession, SessionError> {
        let player = self.player_name().await?;
        let now = self.clock.now();

        let plan = DeckBuilder::new(&self.bank).build(category_filter);
        tracing::info!(
            questions = plan.len(),
            category = %plan.category,
            training,
            player = %player,
            "session started"
        );

        Ok(QuizSession::new(
            plan.questions,
            plan.category,
            player,
            training,
            now,
        ))
    }

    /// Step past the current, resolved question; records the leaderboard
    /// entry when this step completes the session.
    ///
    /// # Errors
    ///
    /// Propagates state-machine rejections from [`QuizSession::advance`]
    /// and `SessionError::Storage` from recording.
    pub async fn advance(&self, session: &mut QuizSession) -> Result<AdvanceOutcome, SessionError> {
        let outcome = session.advance(self.clock.now())?;
        if outcome == AdvanceOutcome::Completed {
            self.record_once(session).await?;
        }
        Ok(outcome)
    }

    /// Skip the current question without resolving it; records the
    /// leaderboard entry when the skip completes the session.
    ///
    /// # Errors
    ///
    /// Propagates state-machine rejections and storage failures.
    pub async fn skip_current(
        &self,
        session: &mut QuizSession,
    ) -> Result<AdvanceOutcome, SessionError> {
        let outcome = session.skip_current(self.clock.now())?;
        if outcome == AdvanceOutcome::Completed {
            self.record_once(session).await?;
        }
        Ok(outcome)
    }

    /// Build the final results for a completed session, recording its
    /// leaderboard entry if that has not happened yet.
    ///
    /// Safe to call again after a transient storage failure: the entry is
    /// appended at most once.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` while the session is still in
    /// progress, or `SessionError::Storage` on persistence failures.
    #[allow(clippy::cast_possible_truncation)]
    pub async fn finalize(
        &self,
        session: &mut QuizSession,
    ) -> Result<SessionResults, SessionError> {
        if !session.is_complete() {
            return Err(SessionError::NotCompleted);
        }
        self.record_once(session).await?;

        let leaderboard = self.leaderboards.load_board(session.category()).await?;
        let tier = session.tier().ok_or(SessionError::NotCompleted)?;

        Ok(SessionResults {
            player: session.player().clone(),
            category: session.category().clone(),
            score: session.score(),
            total: session.total() as u32,
            percent: session.percent(),
            tier,
            leaderboard,
        })
    }

    /// Drop an in-progress session without recording anything.
    pub fn abandon(&self, session: QuizSession) {
        tracing::info!(
            category = %session.category(),
            progress = session.progress().question_number,
            "session abandoned"
        );
        drop(session);
    }

    #[allow(clippy::cast_possible_truncation)]
    async fn record_once(&self, session: &mut QuizSession) -> Result<(), SessionError> {
        if session.recorded() {
            return Ok(());
        }

        let key = session.category().clone();
        let mut board = self.leaderboards.load_board(&key).await?;
        let entry = LeaderboardEntry::new(
            session.player(),
            session.score(),
            session.total() as u32,
            self.clock.now(),
        );
        let retained = board.insert(entry);
        self.leaderboards.save_board(&key, &board).await?;
        session.set_recorded();

        tracing::info!(
            category = %key,
            score = session.score(),
            percent = session.percent(),
            retained,
            "session recorded"
        );
        Ok(())
    }
}
