use rand::Rng;
use rand::seq::SliceRandom;

use quiz_core::{QuestionId, QuestionStore};

/// Questions per normal practice run.
pub const DEFAULT_SAMPLE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    /// Random sample over every question.
    Normal,
    /// Replay of the mistake set.
    Mistakes,
}

/// Ordered question ids for one practice run. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQueue {
    kind: QueueKind,
    ids: Vec<QuestionId>,
}

impl SessionQueue {
    #[must_use]
    pub fn new(kind: QueueKind, ids: Vec<QuestionId>) -> Self {
        Self { kind, ids }
    }

    #[must_use]
    pub fn kind(&self) -> QueueKind {
        self.kind
    }

    #[must_use]
    pub fn ids(&self) -> &[QuestionId] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// An empty queue means "nothing to practice"; do not start a session with it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&QuestionId> {
        self.ids.get(position)
    }
}

/// Builds session queues from the Question Store.
pub struct QueueBuilder;

impl QueueBuilder {
    /// Uniform random permutation of all question ids, truncated to `sample_size`.
    pub fn build_normal<R: Rng + ?Sized>(
        store: &QuestionStore,
        sample_size: usize,
        rng: &mut R,
    ) -> SessionQueue {
        let mut ids: Vec<QuestionId> = store.questions().iter().map(|q| q.id().clone()).collect();
        // Fisher–Yates
        ids.shuffle(rng);
        ids.truncate(sample_size);
        SessionQueue::new(QueueKind::Normal, ids)
    }

    /// Snapshot of the mistake set at call time, in the order mistakes were made.
    ///
    /// Later changes to the mistake set do not affect the returned queue.
    #[must_use]
    pub fn build_mistakes(store: &QuestionStore) -> SessionQueue {
        let ids = store
            .mistake_ids()
            .iter()
            .filter(|id| store.contains(id))
            .cloned()
            .collect();
        SessionQueue::new(QueueKind::Mistakes, ids)
    }
}
