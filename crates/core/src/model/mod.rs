mod ids;
mod mastery;
mod question;

pub use ids::{ParseIdError, QuestionId};
pub use mastery::{MasteryError, MasteryLevel};
pub use question::{DEFAULT_EXPLANATION, Question, QuestionDraft, QuestionError, QuestionKind};
