//! Read-only dashboard figures derived from the Question Store.

use quiz_core::QuestionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dashboard {
    pub total_questions: usize,
    pub mistake_count: usize,
    /// Percentage of questions with mastery above 0.
    pub completion_rate: u8,
    pub mastered_count: usize,
    pub total_answered: u32,
    pub correct_count: u32,
}

impl Dashboard {
    #[must_use]
    pub fn from_store(store: &QuestionStore) -> Self {
        let stats = store.stats();
        Self {
            total_questions: store.len(),
            mistake_count: store.mistake_ids().len(),
            completion_rate: store.completion_rate(),
            mastered_count: store.mastered_count(),
            total_answered: stats.total_answered,
            correct_count: stats.correct_count,
        }
    }

    /// Lifetime share of correct answers, rounded; 0 before the first answer.
    #[must_use]
    pub fn accuracy_percent(&self) -> u8 {
        if self.total_answered == 0 {
            return 0;
        }
        let answered = u64::from(self.total_answered);
        let rate = (200 * u64::from(self.correct_count) + answered) / (2 * answered);
        u8::try_from(rate).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::{QuestionDraft, QuestionId, QuestionKind};

    #[test]
    fn empty_store_reports_zeroes() {
        let dashboard = Dashboard::from_store(&QuestionStore::new());
        assert_eq!(dashboard.total_questions, 0);
        assert_eq!(dashboard.mistake_count, 0);
        assert_eq!(dashboard.completion_rate, 0);
        assert_eq!(dashboard.accuracy_percent(), 0);
    }

    #[test]
    fn reflects_store_contents() {
        let mut store = QuestionStore::new();
        store
            .replace_all((1..=4).map(|i| QuestionDraft {
                id: QuestionId::new(format!("q{i}")),
                kind: QuestionKind::Blank,
                prompt: format!("{i} + {i}"),
                options: Vec::new(),
                answer: (i * 2).to_string(),
                explanation: None,
            }))
            .unwrap();
        store.record_answer(&QuestionId::new("q1"), true).unwrap();
        store.record_answer(&QuestionId::new("q2"), false).unwrap();
        store.record_answer(&QuestionId::new("q3"), false).unwrap();

        let dashboard = Dashboard::from_store(&store);

        assert_eq!(dashboard.total_questions, 4);
        assert_eq!(dashboard.mistake_count, 2);
        assert_eq!(dashboard.completion_rate, 25);
        assert_eq!(dashboard.total_answered, 3);
        assert_eq!(dashboard.correct_count, 1);
        assert_eq!(dashboard.accuracy_percent(), 33);
    }
}
