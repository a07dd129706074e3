//! Persisted snapshot shape.
//!
//! This mirrors the domain `QuestionStore` so the store can be serialized
//! without leaking storage concerns into the core crate.

use quiz_core::{
    AnswerStats, MasteryLevel, Question, QuestionDraft, QuestionId, QuestionKind, QuestionStore,
};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

/// Fixed storage key; the suffix is bumped whenever the schema changes.
pub const STATE_KEY: &str = "quiz_state_v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub mastery_level: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRecord {
    pub total_answered: u32,
    pub correct_count: u32,
}

/// The whole application state as one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRecord {
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
    #[serde(default)]
    pub mistake_set: Vec<String>,
    #[serde(default)]
    pub stats: StatsRecord,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            id: question.id().to_string(),
            kind: question.kind(),
            prompt: question.prompt().to_owned(),
            options: question.options().to_vec(),
            answer: question.answer().to_owned(),
            explanation: Some(question.explanation().to_owned()),
            mastery_level: i64::from(question.mastery().value()),
        }
    }

    /// Convert the record back into a domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` when required fields are empty or the
    /// mastery level is out of range.
    pub fn into_question(self) -> Result<Question, StorageError> {
        let mastery = MasteryLevel::new(self.mastery_level).map_err(ser)?;
        let draft = QuestionDraft {
            id: QuestionId::new(self.id),
            kind: self.kind,
            prompt: self.prompt,
            options: self.options,
            answer: self.answer,
            explanation: self.explanation,
        };
        Question::from_persisted(draft, mastery).map_err(ser)
    }
}

impl StateRecord {
    #[must_use]
    pub fn from_store(store: &QuestionStore) -> Self {
        let stats = store.stats();
        Self {
            questions: store
                .questions()
                .iter()
                .map(QuestionRecord::from_question)
                .collect(),
            mistake_set: store.mistake_ids().iter().map(ToString::to_string).collect(),
            stats: StatsRecord {
                total_answered: stats.total_answered,
                correct_count: stats.correct_count,
            },
        }
    }

    /// Rebuild the domain store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if any question record is invalid or
    /// two records share an id.
    pub fn into_store(self) -> Result<QuestionStore, StorageError> {
        let questions = self
            .questions
            .into_iter()
            .map(QuestionRecord::into_question)
            .collect::<Result<Vec<_>, _>>()?;
        let mistakes = self.mistake_set.into_iter().map(QuestionId::new).collect();
        let stats = AnswerStats {
            total_answered: self.stats.total_answered,
            correct_count: self.stats.correct_count,
        };
        QuestionStore::from_parts(questions, mistakes, stats).map_err(ser)
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(ser)
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String, StorageError> {
        serde_json::to_string_pretty(self).map_err(ser)
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if `raw` is not a valid snapshot document.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw).map_err(ser)
    }
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> QuestionStore {
        let mut store = QuestionStore::new();
        store
            .replace_all(vec![
                QuestionDraft {
                    id: QuestionId::new("q1"),
                    kind: QuestionKind::Single,
                    prompt: "Pick B".into(),
                    options: vec!["a".into(), "b".into()],
                    answer: "B".into(),
                    explanation: Some("because".into()),
                },
                QuestionDraft {
                    id: QuestionId::new("q2"),
                    kind: QuestionKind::Blank,
                    prompt: "Fill".into(),
                    options: Vec::new(),
                    answer: "word".into(),
                    explanation: None,
                },
            ])
            .unwrap();
        store.record_answer(&QuestionId::new("q1"), true).unwrap();
        store.record_answer(&QuestionId::new("q2"), false).unwrap();
        store
    }

    #[test]
    fn snapshot_round_trips_store() {
        let store = sample_store();
        let json = StateRecord::from_store(&store).to_json().unwrap();
        let restored = StateRecord::from_json(&json).unwrap().into_store().unwrap();
        assert_eq!(restored, store);
    }

    #[test]
    fn json_uses_documented_field_names() {
        let json = StateRecord::from_store(&sample_store()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["mistakeSet"][0], "q2");
        assert_eq!(value["stats"]["totalAnswered"], 2);
        assert_eq!(value["stats"]["correctCount"], 1);
        assert_eq!(value["questions"][0]["type"], "single");
        assert_eq!(value["questions"][0]["masteryLevel"], 1);
        assert_eq!(value["questions"][1]["masteryLevel"], -1);
    }

    #[test]
    fn rejects_out_of_range_mastery() {
        let raw = r#"{"questions":[{"id":"q","type":"single","prompt":"p","answer":"a","masteryLevel":9}]}"#;
        let err = StateRecord::from_json(raw).unwrap().into_store().unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let store = StateRecord::from_json("{}").unwrap().into_store().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.stats(), AnswerStats::default());
    }
}
