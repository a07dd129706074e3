use std::io::Read;
use std::path::{Path, PathBuf};

use quiz_core::{Clock, Question, QuestionId, QuestionStore, Response};
use tracing::{info, warn};

use super::machine::{Advance, QuizSession, SubmitOutcome};
use super::progress::SessionSummary;
use super::queue::{DEFAULT_SAMPLE_SIZE, QueueBuilder, SessionQueue};
use crate::error::{ExportError, ImportError, SessionError};
use crate::export::{parse_backup, write_export};
use crate::gateway::PersistenceGateway;
use crate::import::{ImportReport, QuestionImporter};
use crate::stats::Dashboard;

/// Single owner of the application state.
///
/// Holds the `QuestionStore`, the running `QuizSession` and the persistence
/// gateway. Every store mutation is saved before the call returns; a failed
/// save is logged and the in-memory state stays authoritative.
pub struct QuizLoopService {
    clock: Clock,
    gateway: PersistenceGateway,
    store: QuestionStore,
    session: QuizSession,
    sample_size: usize,
}

impl QuizLoopService {
    /// Load the last saved state and return an idle controller.
    pub async fn open(gateway: PersistenceGateway, clock: Clock) -> Self {
        let store = gateway.load().await;
        Self {
            clock,
            gateway,
            store,
            session: QuizSession::new().with_clock(clock),
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }

    /// Replace the session driver, e.g. with a seeded one in tests.
    #[must_use]
    pub fn with_session(mut self, session: QuizSession) -> Self {
        self.session = session.with_clock(self.clock);
        self
    }

    #[must_use]
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    #[must_use]
    pub fn store(&self) -> &QuestionStore {
        &self.store
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn dashboard(&self) -> Dashboard {
        Dashboard::from_store(&self.store)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.session
            .current_question_id()
            .and_then(|id| self.store.get(id))
    }

    //
    // ─── IMPORT / RESTORE / RESET ───────────────────────────────────────────────
    //

    /// Import a CSV question sheet, replacing all questions.
    ///
    /// # Errors
    ///
    /// Returns `ImportError` if the sheet cannot be parsed or has no valid rows.
    /// The existing questions are left untouched in that case.
    pub async fn import_csv<R: Read>(&mut self, reader: R) -> Result<ImportReport, ImportError> {
        let sheet = QuestionImporter::parse_reader(reader)?;
        self.install_questions(sheet.questions).await?;
        Ok(sheet.report)
    }

    /// # Errors
    ///
    /// Returns `ImportError` if the file cannot be read or parsed.
    pub async fn import_path(&mut self, path: &Path) -> Result<ImportReport, ImportError> {
        let sheet = QuestionImporter::parse_path(path)?;
        self.install_questions(sheet.questions).await?;
        Ok(sheet.report)
    }

    /// Replace the whole state with a JSON backup.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Parse` if the backup is invalid; state is unchanged.
    pub async fn restore_backup(&mut self, raw: &str) -> Result<usize, ExportError> {
        let restored = parse_backup(raw)?;
        let count = restored.len();
        self.install(restored).await;
        info!(count, "restored backup");
        Ok(count)
    }

    /// Write a dated JSON backup into `dir`.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if the file cannot be written.
    pub fn export_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        write_export(dir, &self.store, &self.clock)
    }

    /// Reset mastery and the mistake set but keep the questions.
    pub async fn reset_progress(&mut self) {
        self.session.exit();
        self.store.reset_progress();
        self.persist().await;
    }

    /// Drop all data, including the saved snapshot.
    pub async fn clear_all(&mut self) {
        self.session.exit();
        self.store.clear();
        if let Err(err) = self.gateway.clear().await {
            warn!(error = %err, "failed to delete saved state");
        }
    }

    //
    // ─── SESSION ────────────────────────────────────────────────────────────────
    //

    /// Start a random practice run over the whole question set.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` when there are no questions and
    /// `SessionError::AlreadyActive` if a run is in progress.
    pub fn start_normal(&mut self) -> Result<&QuestionId, SessionError> {
        let queue =
            QueueBuilder::build_normal(&self.store, self.sample_size, self.session.rng_mut());
        self.start(queue)
    }

    /// Start a review run over the current mistake set.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` when there are no mistakes and
    /// `SessionError::AlreadyActive` if a run is in progress.
    pub fn start_mistakes(&mut self) -> Result<&QuestionId, SessionError> {
        let queue = QueueBuilder::build_mistakes(&self.store);
        self.start(queue)
    }

    fn start(&mut self, queue: SessionQueue) -> Result<&QuestionId, SessionError> {
        let kind = queue.kind();
        let len = queue.len();
        self.session.start(queue)?;
        info!(?kind, len, "practice started");
        self.session
            .current_question_id()
            .ok_or(SessionError::NotActive)
    }

    /// Grade the answer to the current question and persist the result.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError` from the state machine.
    pub async fn submit(&mut self, response: Response) -> Result<SubmitOutcome, SessionError> {
        let outcome = self.session.submit(&mut self.store, response)?;
        if matches!(outcome, SubmitOutcome::Graded(_)) {
            self.persist().await;
        }
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Propagates `SessionError` from the state machine.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        let step = self.session.advance()?;
        if let Advance::Complete(summary) = &step {
            info!(
                answered = summary.answered,
                correct = summary.correct,
                "practice complete"
            );
        }
        Ok(step)
    }

    pub fn exit(&mut self) -> Option<SessionSummary> {
        self.session.exit()
    }

    /// Manually remove a question from the mistake set ("I know this now").
    pub async fn dismiss_mistake(&mut self, id: &QuestionId) -> bool {
        let removed = self.store.dismiss_mistake(id);
        if removed {
            self.persist().await;
        }
        removed
    }

    /// Swap in imported questions; on a duplicate id nothing changes.
    async fn install_questions(&mut self, questions: Vec<Question>) -> Result<usize, ImportError> {
        let count = self.store.replace_questions(questions)?;
        self.session.exit();
        self.persist().await;
        info!(count, "imported questions");
        Ok(count)
    }

    async fn install(&mut self, store: QuestionStore) {
        self.session.exit();
        self.store = store;
        self.persist().await;
    }

    async fn persist(&self) {
        if let Err(err) = self.gateway.save(&self.store).await {
            warn!(error = %err, "failed to save state; continuing with in-memory state");
        }
    }
}
