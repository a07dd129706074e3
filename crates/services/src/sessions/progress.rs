use chrono::{DateTime, Utc};

use super::queue::QueueKind;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    /// Zero-based index of the current question.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
}

/// Tally of a finished (or abandoned) run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub kind: QueueKind,
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub completed: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SessionSummary {
    /// Rounded share of correct answers among answered questions; 0 when none were answered.
    #[must_use]
    pub fn accuracy_percent(&self) -> u8 {
        if self.answered == 0 {
            return 0;
        }
        let rate = (200 * self.correct + self.answered) / (2 * self.answered);
        u8::try_from(rate).unwrap_or(100)
    }
}
