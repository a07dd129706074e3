use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ids::QuestionId, mastery::MasteryLevel};

/// Shown after answering when the source row carries no explanation.
pub const DEFAULT_EXPLANATION: &str = "No explanation provided.";

const BLANK_MARKERS: &[&str] = &["填空", "blank", "fill"];
const MULTIPLE_MARKERS: &[&str] = &["多选", "multiple", "multi"];

//
// ─── QUESTION KIND ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    #[default]
    Single,
    Multiple,
    Blank,
}

impl QuestionKind {
    /// Maps the free-form type column of an imported sheet to a kind.
    ///
    /// Blank markers win over multiple-choice markers; anything else is single choice.
    #[must_use]
    pub fn from_type_label(label: &str) -> Self {
        let lowered = label.trim().to_lowercase();
        if BLANK_MARKERS.iter().any(|m| lowered.contains(m)) {
            Self::Blank
        } else if MULTIPLE_MARKERS.iter().any(|m| lowered.contains(m)) {
            Self::Multiple
        } else {
            Self::Single
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multiple => "multiple",
            Self::Blank => "blank",
        }
    }

    #[must_use]
    pub fn has_options(self) -> bool {
        !matches!(self, Self::Blank)
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id cannot be empty")]
    EmptyId,

    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question answer cannot be empty")]
    EmptyAnswer,
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated question record, as produced by an importer or a backup file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub id: QuestionId,
    pub kind: QuestionKind,
    pub prompt: String,
    pub options: Vec<String>,
    pub answer: String,
    pub explanation: Option<String>,
}

impl QuestionDraft {
    /// Validate required fields and normalize whitespace.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the id, prompt or answer is empty.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let id = self.id.as_str().trim();
        if id.is_empty() {
            return Err(QuestionError::EmptyId);
        }
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        let answer = self.answer.trim();
        if answer.is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }

        let options = if self.kind.has_options() {
            self.options
                .iter()
                .map(|o| o.trim())
                .filter(|o| !o.is_empty())
                .map(str::to_owned)
                .collect()
        } else {
            Vec::new()
        };

        let explanation = self
            .explanation
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_EXPLANATION)
            .to_owned();

        Ok(Question {
            id: QuestionId::new(id),
            kind: self.kind,
            prompt: prompt.to_owned(),
            options,
            answer: answer.to_owned(),
            explanation,
            mastery: MasteryLevel::UNSEEN,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One validated knowledge unit. Mastery only changes through the `QuestionStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    kind: QuestionKind,
    prompt: String,
    options: Vec<String>,
    answer: String,
    explanation: String,
    mastery: MasteryLevel,
}

impl Question {
    /// Rehydrate a question together with its stored mastery level.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the persisted record is missing required fields.
    pub fn from_persisted(draft: QuestionDraft, mastery: MasteryLevel) -> Result<Self, QuestionError> {
        let mut question = draft.validate()?;
        question.mastery = mastery;
        Ok(question)
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn mastery(&self) -> MasteryLevel {
        self.mastery
    }

    /// Option letter (`A`, `B`, ...) for the option at `index`.
    #[must_use]
    pub fn option_label(index: usize) -> char {
        u8::try_from(index)
            .ok()
            .filter(|i| *i < 26)
            .map_or('?', |i| char::from(b'A' + i))
    }

    pub(crate) fn set_mastery(&mut self, mastery: MasteryLevel) {
        self.mastery = mastery;
    }

    pub(crate) fn reset_mastery(&mut self) {
        self.mastery = MasteryLevel::UNSEEN;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
