use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::time::Duration as StdDuration;

use quiz_core::model::{CategoryKey, PlayerName, Question, ResultTier, percent_of};

use super::progress::SessionProgress;
use crate::error::SessionError;

/// Seconds the player has to answer each question outside training mode.
pub const QUESTION_TIME_LIMIT_SECS: i64 = 20;

/// Pause before auto-advancing after a correct answer.
pub const ADVANCE_DELAY_CORRECT: StdDuration = StdDuration::from_millis(800);

/// Pause before auto-advancing after a wrong answer or a timeout, long
/// enough to read the revealed correct answer.
pub const ADVANCE_DELAY_INCORRECT: StdDuration = StdDuration::from_millis(1500);

//
// ─── ANSWER OUTCOMES ───────────────────────────────────────────────────────────
//

/// How the current question was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    TimedOut,
}

impl AnswerOutcome {
    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }

    /// How long the presentation should linger before advancing.
    #[must_use]
    pub fn advance_delay(self) -> StdDuration {
        match self {
            Self::Correct => ADVANCE_DELAY_CORRECT,
            Self::Incorrect | Self::TimedOut => ADVANCE_DELAY_INCORRECT,
        }
    }
}

/// Record of one resolved question within a session.
///
/// `given` is `None` for timeouts; skipped questions produce no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub index: usize,
    pub given: Option<String>,
    pub outcome: AnswerOutcome,
}

/// Feedback returned to the presentation layer after each answer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub outcome: AnswerOutcome,
    /// Always reported so a wrong or timed-out answer can be revealed.
    pub correct_answer: String,
    pub score: u32,
}

/// Result of stepping past the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    NextQuestion,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuestionState {
    /// Question shown, waiting for an answer. `deadline` is `None` in
    /// training mode.
    Active { deadline: Option<DateTime<Utc>> },
    Answered(AnswerOutcome),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz session: one deck of up to 10 questions stepped through
/// sequentially.
///
/// Per question: `active → answered (correct | incorrect | timed out) →
/// advance`. The session completes exactly once, when the index steps past
/// the last question. The countdown is modelled as a deadline owned by the
/// session; the presentation layer schedules (and cancels) the single sleep
/// task that fires [`QuizSession::expire_current`].
pub struct QuizSession {
    deck: Vec<Question>,
    category: CategoryKey,
    player: PlayerName,
    training: bool,
    current: usize,
    score: u32,
    state: QuestionState,
    results: Vec<AnswerRecord>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    recorded: bool,
}

impl QuizSession {
    /// Create a session over an already-built deck.
    ///
    /// An empty deck yields an immediately-completed 0/0 session rather
    /// than an error: the caller shows the results screen straight away.
    #[must_use]
    pub fn new(
        deck: Vec<Question>,
        category: CategoryKey,
        player: PlayerName,
        training: bool,
        started_at: DateTime<Utc>,
    ) -> Self {
        let completed_at = deck.is_empty().then_some(started_at);
        Self {
            deck,
            category,
            player,
            training,
            current: 0,
            score: 0,
            state: QuestionState::Active {
                deadline: Self::deadline_from(training, started_at),
            },
            results: Vec::new(),
            started_at,
            completed_at,
            recorded: false,
        }
    }

    fn deadline_from(training: bool, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        (!training).then(|| now + Duration::seconds(QUESTION_TIME_LIMIT_SECS))
    }

    #[must_use]
    pub fn category(&self) -> &CategoryKey {
        &self.category
    }

    #[must_use]
    pub fn player(&self) -> &PlayerName {
        &self.player
    }

    #[must_use]
    pub fn training(&self) -> bool {
        self.training
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Total number of questions dealt into this session.
    #[must_use]
    pub fn total(&self) -> usize {
        self.deck.len()
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn percent(&self) -> u8 {
        percent_of(self.score, self.deck.len() as u32)
    }

    /// Result tier, available once the session has completed.
    #[must_use]
    pub fn tier(&self) -> Option<ResultTier> {
        self.is_complete()
            .then(|| ResultTier::from_percent(self.percent()))
    }

    #[must_use]
    pub fn results(&self) -> &[AnswerRecord] {
        &self.results
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_complete() {
            return None;
        }
        self.deck.get(self.current)
    }

    /// Whole seconds left on the current question, rounded up.
    ///
    /// `None` while untimed: in training mode, once the question is
    /// answered, or when no question is active.
    #[must_use]
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        if self.current_question().is_none() {
            return None;
        }
        let QuestionState::Active {
            deadline: Some(deadline),
        } = self.state
        else {
            return None;
        };
        let left_ms = (deadline - now).num_milliseconds().max(0);
        Some((left_ms as u64).div_ceil(1000) as i64)
    }

    /// The deadline the presentation layer should sleep until, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        if self.current_question().is_none() {
            return None;
        }
        match self.state {
            QuestionState::Active { deadline } => deadline,
            QuestionState::Answered(_) => None,
        }
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            question_number: (self.current + 1).min(self.deck.len()),
            total: self.deck.len(),
            score: self.score,
            is_complete: self.is_complete(),
        }
    }

    /// Resolve the current question with the player's answer.
    ///
    /// Exact string comparison against the correct answer; the score
    /// increments on a match. Answering leaves the active state, which
    /// cancels the pending countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after the session has finished and
    /// `SessionError::AlreadyAnswered` on repeat submissions.
    pub fn submit_answer(&mut self, answer: &str) -> Result<AnswerFeedback, SessionError> {
        let Some(question) = self.current_question() else {
            return Err(SessionError::Completed);
        };
        if matches!(self.state, QuestionState::Answered(_)) {
            return Err(SessionError::AlreadyAnswered);
        }

        let outcome = if question.is_correct(answer) {
            AnswerOutcome::Correct
        } else {
            AnswerOutcome::Incorrect
        };
        let correct_answer = question.correct().to_owned();

        if outcome.is_correct() {
            self.score += 1;
        }
        self.state = QuestionState::Answered(outcome);
        self.results.push(AnswerRecord {
            index: self.current,
            given: Some(answer.to_owned()),
            outcome,
        });

        Ok(AnswerFeedback {
            outcome,
            correct_answer,
            score: self.score,
        })
    }

    /// Resolve the current question as timed out.
    ///
    /// Equivalent to an incorrect answer with no player answer recorded.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after the session has finished,
    /// `SessionError::AlreadyAnswered` if the question was resolved before
    /// the timer event arrived, and `SessionError::Untimed` in training
    /// mode.
    pub fn expire_current(&mut self) -> Result<AnswerFeedback, SessionError> {
        let Some(question) = self.current_question() else {
            return Err(SessionError::Completed);
        };
        match self.state {
            QuestionState::Answered(_) => return Err(SessionError::AlreadyAnswered),
            QuestionState::Active { deadline: None } => return Err(SessionError::Untimed),
            QuestionState::Active { deadline: Some(_) } => {}
        }

        let correct_answer = question.correct().to_owned();
        self.state = QuestionState::Answered(AnswerOutcome::TimedOut);
        self.results.push(AnswerRecord {
            index: self.current,
            given: None,
            outcome: AnswerOutcome::TimedOut,
        });

        Ok(AnswerFeedback {
            outcome: AnswerOutcome::TimedOut,
            correct_answer,
            score: self.score,
        })
    }

    /// Step past the current, resolved question.
    ///
    /// Activates the next question with a fresh deadline, or completes the
    /// session when the deck is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after the session has finished and
    /// `SessionError::NotAnswered` while the current question is still
    /// pending (use [`QuizSession::skip_current`] to bypass it).
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<AdvanceOutcome, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        if matches!(self.state, QuestionState::Active { .. }) {
            return Err(SessionError::NotAnswered);
        }
        Ok(self.step_forward(now))
    }

    /// Abandon the current question and move on without resolving it.
    ///
    /// The question still counts toward the total, so skipping lowers the
    /// final percentage. Cancels the pending countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after the session has finished.
    pub fn skip_current(&mut self, now: DateTime<Utc>) -> Result<AdvanceOutcome, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        Ok(self.step_forward(now))
    }

    fn step_forward(&mut self, now: DateTime<Utc>) -> AdvanceOutcome {
        self.current += 1;
        if self.current < self.deck.len() {
            self.state = QuestionState::Active {
                deadline: Self::deadline_from(self.training, now),
            };
            AdvanceOutcome::NextQuestion
        } else {
            self.completed_at = Some(now);
            AdvanceOutcome::Completed
        }
    }

    /// Whether this session's leaderboard entry has been persisted.
    #[must_use]
    pub fn recorded(&self) -> bool {
        self.recorded
    }

    pub(crate) fn set_recorded(&mut self) {
        self.recorded = true;
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("category", &self.category)
            .field("player", &self.player)
            .field("training", &self.training)
            .field("deck_len", &self.deck.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .field("recorded", &self.recorded)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{QuestionDraft, ResultTier};
    use quiz_core::time::fixed_now;

    fn question(n: u32) -> Question {
        QuestionDraft {
            text: format!("Q{n}"),
            category: "History".into(),
            answers: vec![format!("right{n}"), format!("wrong{n}")],
            correct: format!("right{n}"),
        }
        .validate()
        .unwrap()
    }

    fn session(questions: u32, training: bool) -> QuizSession {
        let deck = (0..questions).map(question).collect();
        QuizSession::new(
            deck,
            CategoryKey::named("History"),
            PlayerName::new("Awa"),
            training,
            fixed_now(),
        )
    }

    #[test]
    fn timed_question_exposes_full_countdown() {
        let s = session(2, false);
        assert_eq!(
            s.remaining_seconds(fixed_now()),
            Some(QUESTION_TIME_LIMIT_SECS)
        );
        assert_eq!(
            s.deadline(),
            Some(fixed_now() + Duration::seconds(QUESTION_TIME_LIMIT_SECS))
        );
    }

    #[test]
    fn countdown_rounds_up_and_clamps_at_zero() {
        let s = session(1, false);
        let late = fixed_now() + Duration::milliseconds(19_500);
        assert_eq!(s.remaining_seconds(late), Some(1));
        let past = fixed_now() + Duration::seconds(25);
        assert_eq!(s.remaining_seconds(past), Some(0));
    }

    #[test]
    fn training_mode_is_untimed() {
        let mut s = session(2, true);
        assert_eq!(s.remaining_seconds(fixed_now()), None);
        assert_eq!(s.deadline(), None);
        assert!(matches!(
            s.expire_current().unwrap_err(),
            SessionError::Untimed
        ));
    }

    #[test]
    fn correct_answer_scores_and_uses_short_delay() {
        let mut s = session(2, false);
        let feedback = s.submit_answer("right0").unwrap();
        assert_eq!(feedback.outcome, AnswerOutcome::Correct);
        assert_eq!(feedback.score, 1);
        assert_eq!(feedback.outcome.advance_delay(), ADVANCE_DELAY_CORRECT);
        assert_eq!(s.score(), 1);
    }

    #[test]
    fn wrong_answer_reveals_correct_and_uses_long_delay() {
        let mut s = session(2, false);
        let feedback = s.submit_answer("wrong0").unwrap();
        assert_eq!(feedback.outcome, AnswerOutcome::Incorrect);
        assert_eq!(feedback.correct_answer, "right0");
        assert_eq!(feedback.outcome.advance_delay(), ADVANCE_DELAY_INCORRECT);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn timeout_counts_as_incorrect_and_reveals_answer() {
        let mut s = session(2, false);
        let feedback = s.expire_current().unwrap();
        assert_eq!(feedback.outcome, AnswerOutcome::TimedOut);
        assert_eq!(feedback.correct_answer, "right0");
        assert_eq!(s.score(), 0);
        assert_eq!(s.results()[0].given, None);
    }

    #[test]
    fn repeat_submission_is_rejected_without_state_change() {
        let mut s = session(2, false);
        s.submit_answer("right0").unwrap();
        assert!(matches!(
            s.submit_answer("wrong0").unwrap_err(),
            SessionError::AlreadyAnswered
        ));
        assert!(matches!(
            s.expire_current().unwrap_err(),
            SessionError::AlreadyAnswered
        ));
        assert_eq!(s.score(), 1);
        assert_eq!(s.results().len(), 1);
    }

    #[test]
    fn advance_requires_an_answer() {
        let mut s = session(2, false);
        assert!(matches!(
            s.advance(fixed_now()).unwrap_err(),
            SessionError::NotAnswered
        ));
    }

    #[test]
    fn advance_restarts_countdown_for_next_question() {
        let mut s = session(2, false);
        s.submit_answer("right0").unwrap();
        let later = fixed_now() + Duration::seconds(5);
        assert_eq!(s.advance(later).unwrap(), AdvanceOutcome::NextQuestion);
        assert_eq!(s.current_question().unwrap().text(), "Q1");
        assert_eq!(
            s.remaining_seconds(later),
            Some(QUESTION_TIME_LIMIT_SECS)
        );
    }

    #[test]
    fn session_completes_exactly_once() {
        let mut s = session(2, false);
        s.submit_answer("right0").unwrap();
        s.advance(fixed_now()).unwrap();
        s.submit_answer("wrong1").unwrap();
        let done_at = fixed_now() + Duration::seconds(30);
        assert_eq!(s.advance(done_at).unwrap(), AdvanceOutcome::Completed);
        assert!(s.is_complete());
        assert_eq!(s.completed_at(), Some(done_at));

        assert!(matches!(
            s.advance(done_at).unwrap_err(),
            SessionError::Completed
        ));
        assert!(matches!(
            s.submit_answer("right0").unwrap_err(),
            SessionError::Completed
        ));
        assert_eq!(s.score(), 1);
        assert_eq!(s.percent(), 50);
        assert_eq!(s.tier(), Some(ResultTier::Good));
    }

    #[test]
    fn skip_advances_without_scoring() {
        let mut s = session(2, false);
        assert_eq!(
            s.skip_current(fixed_now()).unwrap(),
            AdvanceOutcome::NextQuestion
        );
        assert_eq!(s.score(), 0);
        assert_eq!(s.total(), 2);
        assert!(s.results().is_empty());

        s.submit_answer("right1").unwrap();
        assert_eq!(
            s.advance(fixed_now()).unwrap(),
            AdvanceOutcome::Completed
        );
        // The skipped question still drags the percentage down.
        assert_eq!(s.percent(), 50);
    }

    #[test]
    fn empty_deck_completes_immediately_with_zero_percent() {
        let s = QuizSession::new(
            Vec::new(),
            CategoryKey::AllCategories,
            PlayerName::default(),
            false,
            fixed_now(),
        );
        assert!(s.is_complete());
        assert_eq!(s.total(), 0);
        assert_eq!(s.percent(), 0);
        assert_eq!(s.tier(), Some(ResultTier::Encouragement));
        assert_eq!(s.current_question(), None);
    }

    #[test]
    fn progress_tracks_question_number_and_score() {
        let mut s = session(3, false);
        let p = s.progress();
        assert_eq!((p.question_number, p.total, p.score), (1, 3, 0));

        s.submit_answer("right0").unwrap();
        s.advance(fixed_now()).unwrap();
        let p = s.progress();
        assert_eq!((p.question_number, p.total, p.score), (2, 3, 1));
        assert!(!p.is_complete);
    }
}
