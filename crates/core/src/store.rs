//! The Question Store: every question, the mistake set, and lifetime answer counters.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{MasteryLevel, Question, QuestionDraft, QuestionError, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    #[error("invalid question at position {index}: {source}")]
    Validation {
        index: usize,
        #[source]
        source: QuestionError,
    },

    #[error("duplicate question id: {0}")]
    DuplicateId(QuestionId),

    #[error("question not found: {0}")]
    NotFound(QuestionId),
}

//
// ─── STATS ─────────────────────────────────────────────────────────────────────
//

/// Lifetime answer counters. Both only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerStats {
    pub total_answered: u32,
    pub correct_count: u32,
}

/// What a single `record_answer` call changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerEffect {
    pub previous: MasteryLevel,
    pub current: MasteryLevel,
    pub entered_mistakes: bool,
    pub left_mistakes: bool,
}

//
// ─── STORE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionStore {
    questions: Vec<Question>,
    index: HashMap<QuestionId, usize>,
    mistakes: Vec<QuestionId>,
    stats: AnswerStats,
}

impl QuestionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted parts.
    ///
    /// Mistake ids that reference unknown questions, and repeated mistake ids,
    /// are dropped so the mistake set stays a set over existing questions.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateId` if two questions share an id.
    pub fn from_parts(
        questions: Vec<Question>,
        mistake_ids: Vec<QuestionId>,
        stats: AnswerStats,
    ) -> Result<Self, StoreError> {
        let index = build_index(&questions)?;
        let mut seen = HashSet::new();
        let mistakes = mistake_ids
            .into_iter()
            .filter(|id| index.contains_key(id) && seen.insert(id.clone()))
            .collect();

        Ok(Self {
            questions,
            index,
            mistakes,
            stats,
        })
    }

    /// Replace every question with a freshly imported set.
    ///
    /// All drafts are validated before anything changes, so a failure leaves the
    /// store untouched. Imported questions start at mastery 0 and the mistake set
    /// is cleared. Answer counters are kept.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for the first invalid draft or
    /// `StoreError::DuplicateId` when two drafts share an id.
    pub fn replace_all(
        &mut self,
        drafts: impl IntoIterator<Item = QuestionDraft>,
    ) -> Result<usize, StoreError> {
        let questions = drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                draft
                    .validate()
                    .map_err(|source| StoreError::Validation { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.replace_questions(questions)
    }

    /// Same as `replace_all` for questions that were validated already.
    ///
    /// Incoming mastery is reset to 0.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateId` when two questions share an id; the store
    /// is unchanged in that case.
    pub fn replace_questions(&mut self, mut questions: Vec<Question>) -> Result<usize, StoreError> {
        let index = build_index(&questions)?;
        for question in &mut questions {
            question.reset_mastery();
        }

        self.questions = questions;
        self.index = index;
        self.mistakes.clear();
        Ok(self.questions.len())
    }

    /// Apply a graded answer to the question's mastery and mistake membership.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if `id` is not in the store. Counters are
    /// not touched in that case.
    pub fn record_answer(
        &mut self,
        id: &QuestionId,
        was_correct: bool,
    ) -> Result<AnswerEffect, StoreError> {
        let position = *self
            .index
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let question = &mut self.questions[position];
        let previous = question.mastery();

        self.stats.total_answered = self.stats.total_answered.saturating_add(1);

        if was_correct {
            self.stats.correct_count = self.stats.correct_count.saturating_add(1);
            let current = previous.promote();
            question.set_mastery(current);
            let left_mistakes = current.is_mastered() && self.remove_mistake(id);
            Ok(AnswerEffect {
                previous,
                current,
                entered_mistakes: false,
                left_mistakes,
            })
        } else {
            question.set_mastery(MasteryLevel::MISSED);
            let entered_mistakes = if self.is_mistake(id) {
                false
            } else {
                self.mistakes.push(id.clone());
                true
            };
            Ok(AnswerEffect {
                previous,
                current: MasteryLevel::MISSED,
                entered_mistakes,
                left_mistakes: false,
            })
        }
    }

    /// Manually drop a question from the mistake set. Returns whether it was present.
    pub fn dismiss_mistake(&mut self, id: &QuestionId) -> bool {
        self.remove_mistake(id)
    }

    /// Percentage of questions with mastery above 0, rounded to the nearest integer.
    #[must_use]
    pub fn completion_rate(&self) -> u8 {
        let total = self.questions.len();
        if total == 0 {
            return 0;
        }
        let learned = self.learned_count();
        // round-half-up of 100 * learned / total without floats
        let rate = (200 * learned + total) / (2 * total);
        u8::try_from(rate).unwrap_or(100)
    }

    /// Forget everything, counters included.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Reset every question to unseen and empty the mistake set, keeping the questions.
    pub fn reset_progress(&mut self) {
        for question in &mut self.questions {
            question.reset_mastery();
        }
        self.mistakes.clear();
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.index.get(id).map(|&i| &self.questions[i])
    }

    #[must_use]
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Mistake set in the order ids were added.
    #[must_use]
    pub fn mistake_ids(&self) -> &[QuestionId] {
        &self.mistakes
    }

    #[must_use]
    pub fn is_mistake(&self, id: &QuestionId) -> bool {
        self.mistakes.contains(id)
    }

    #[must_use]
    pub fn stats(&self) -> AnswerStats {
        self.stats
    }

    #[must_use]
    pub fn learned_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.mastery().is_learned())
            .count()
    }

    #[must_use]
    pub fn mastered_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.mastery().is_mastered())
            .count()
    }

    fn remove_mistake(&mut self, id: &QuestionId) -> bool {
        let before = self.mistakes.len();
        self.mistakes.retain(|m| m != id);
        self.mistakes.len() != before
    }
}

fn build_index(questions: &[Question]) -> Result<HashMap<QuestionId, usize>, StoreError> {
    let mut index = HashMap::with_capacity(questions.len());
    for (position, question) in questions.iter().enumerate() {
        if index.insert(question.id().clone(), position).is_some() {
            return Err(StoreError::DuplicateId(question.id().clone()));
        }
    }
    Ok(index)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
