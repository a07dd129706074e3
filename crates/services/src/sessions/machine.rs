use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use tracing::debug;

use quiz_core::{Clock, MasteryLevel, QuestionId, QuestionStore, Response, StoreError, grade};

use super::encouragement::encouragement_for;
use super::progress::{SessionProgress, SessionSummary};
use super::queue::{QueueKind, SessionQueue};
use crate::error::SessionError;

//
// ─── STATES & OUTCOMES ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No run in progress.
    Idle,
    /// A question is shown and waiting for an answer.
    Presenting,
    /// The answer was graded and feedback is shown.
    Answered,
}

/// What the learner sees after submitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub question_id: QuestionId,
    pub response: Response,
    pub correct: bool,
    pub expected: String,
    pub explanation: String,
    pub mastery: MasteryLevel,
    pub left_mistakes: bool,
    pub encouragement: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Graded(Feedback),
    /// The current question was already graded; nothing changed.
    AlreadyAnswered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Next(QuestionId),
    Complete(SessionSummary),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Drives one practice run: Idle → Presenting → Answered → Presenting … → Idle.
///
/// The session never owns the `QuestionStore`; callers pass it to `submit` so the
/// store stays the single source of truth and can be persisted after each answer.
pub struct QuizSession {
    clock: Clock,
    rng: StdRng,
    phase: SessionPhase,
    queue: Option<SessionQueue>,
    position: usize,
    feedback: Option<Feedback>,
    wrong_streak: u32,
    answered: usize,
    correct: usize,
    started_at: DateTime<Utc>,
}

impl QuizSession {
    /// Idle session with an OS-seeded random source.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Idle session with a deterministic random source, for tests.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let clock = Clock::default();
        Self {
            clock,
            rng,
            phase: SessionPhase::Idle,
            queue: None,
            position: 0,
            feedback: None,
            wrong_streak: 0,
            answered: 0,
            correct: 0,
            started_at: clock.now(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Random source shared with queue building so one seed drives a whole test.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase != SessionPhase::Idle
    }

    #[must_use]
    pub fn kind(&self) -> Option<QueueKind> {
        self.queue.as_ref().map(SessionQueue::kind)
    }

    #[must_use]
    pub fn current_question_id(&self) -> Option<&QuestionId> {
        self.queue.as_ref().and_then(|q| q.get(self.position))
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    #[must_use]
    pub fn wrong_streak(&self) -> u32 {
        self.wrong_streak
    }

    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        self.queue.as_ref().map(|q| SessionProgress {
            position: self.position,
            total: q.len(),
            answered: self.answered,
            correct: self.correct,
        })
    }

    /// Begin a run over `queue`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` for an empty queue and
    /// `SessionError::AlreadyActive` if a run is in progress.
    pub fn start(&mut self, queue: SessionQueue) -> Result<(), SessionError> {
        if self.is_active() {
            return Err(SessionError::AlreadyActive);
        }
        if queue.is_empty() {
            return Err(SessionError::Empty);
        }

        debug!(kind = ?queue.kind(), len = queue.len(), "session started");
        self.queue = Some(queue);
        self.position = 0;
        self.feedback = None;
        self.wrong_streak = 0;
        self.answered = 0;
        self.correct = 0;
        self.started_at = self.clock.now();
        self.phase = SessionPhase::Presenting;
        Ok(())
    }

    /// Grade `response` against the current question and record it in `store`.
    ///
    /// A second call while the question is already graded is a no-op and returns
    /// `SubmitOutcome::AlreadyAnswered`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` when idle, and `SessionError::Store` when
    /// the queued id is missing from the store (the session stays on the question).
    pub fn submit(
        &mut self,
        store: &mut QuestionStore,
        response: Response,
    ) -> Result<SubmitOutcome, SessionError> {
        match self.phase {
            SessionPhase::Idle => return Err(SessionError::NotActive),
            SessionPhase::Answered => return Ok(SubmitOutcome::AlreadyAnswered),
            SessionPhase::Presenting => {}
        }

        let id = self
            .current_question_id()
            .cloned()
            .ok_or(SessionError::NotActive)?;
        let question = store
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let correct = grade(question, &response);
        let expected = question.answer().to_owned();
        let explanation = question.explanation().to_owned();

        let effect = store.record_answer(&id, correct)?;

        self.answered += 1;
        let encouragement = if correct {
            self.correct += 1;
            self.wrong_streak = 0;
            None
        } else {
            self.wrong_streak = self.wrong_streak.saturating_add(1);
            encouragement_for(self.wrong_streak, &mut self.rng)
        };

        let feedback = Feedback {
            question_id: id,
            response,
            correct,
            expected,
            explanation,
            mastery: effect.current,
            left_mistakes: effect.left_mistakes,
            encouragement,
        };
        self.feedback = Some(feedback.clone());
        self.phase = SessionPhase::Answered;
        Ok(SubmitOutcome::Graded(feedback))
    }

    /// Move past the graded question, or finish the run after the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` when idle and `SessionError::NotAnswered`
    /// when the current question has not been graded.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        match self.phase {
            SessionPhase::Idle => return Err(SessionError::NotActive),
            SessionPhase::Presenting => return Err(SessionError::NotAnswered),
            SessionPhase::Answered => {}
        }

        let total = self.queue.as_ref().map_or(0, SessionQueue::len);
        if self.position + 1 < total {
            self.position += 1;
            self.feedback = None;
            self.phase = SessionPhase::Presenting;
            let next = self
                .current_question_id()
                .cloned()
                .ok_or(SessionError::NotActive)?;
            return Ok(Advance::Next(next));
        }

        Ok(Advance::Complete(self.finish(true)))
    }

    /// Leave the run from any state. Answers already recorded in the store stay.
    pub fn exit(&mut self) -> Option<SessionSummary> {
        if self.is_active() {
            Some(self.finish(false))
        } else {
            None
        }
    }

    fn finish(&mut self, completed: bool) -> SessionSummary {
        let summary = SessionSummary {
            kind: self.kind().unwrap_or(QueueKind::Normal),
            total: self.queue.as_ref().map_or(0, SessionQueue::len),
            answered: self.answered,
            correct: self.correct,
            completed,
            started_at: self.started_at,
            finished_at: self.clock.now(),
        };
        debug!(completed, answered = summary.answered, "session finished");

        self.queue = None;
        self.position = 0;
        self.feedback = None;
        self.phase = SessionPhase::Idle;
        summary
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("phase", &self.phase)
            .field("queue_len", &self.queue.as_ref().map(SessionQueue::len))
            .field("position", &self.position)
            .field("wrong_streak", &self.wrong_streak)
            .field("answered", &self.answered)
            .field("correct", &self.correct)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
