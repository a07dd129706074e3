#![forbid(unsafe_code)]

pub mod grading;
pub mod model;
pub mod store;
pub mod time;

pub use grading::{Response, grade};
pub use model::{
    DEFAULT_EXPLANATION, MasteryError, MasteryLevel, Question, QuestionDraft, QuestionError,
    QuestionId, QuestionKind,
};
pub use store::{AnswerEffect, AnswerStats, QuestionStore, StoreError};
pub use time::Clock;
