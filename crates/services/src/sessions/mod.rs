mod encouragement;
mod machine;
mod progress;
mod queue;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use encouragement::{ENCOURAGEMENT_STREAK, ENCOURAGEMENTS};
pub use machine::{Advance, Feedback, QuizSession, SessionPhase, SubmitOutcome};
pub use progress::{SessionProgress, SessionSummary};
pub use queue::{DEFAULT_SAMPLE_SIZE, QueueBuilder, QueueKind, SessionQueue};
pub use workflow::QuizLoopService;
