#![forbid(unsafe_code)]

pub mod error;
pub mod export;
pub mod gateway;
pub mod import;
pub mod sessions;
pub mod stats;

pub use quiz_core::Clock;

pub use error::{ExportError, GatewayError, ImportError, SessionError};
pub use gateway::PersistenceGateway;
pub use import::{ImportReport, ParsedSheet, QuestionImporter, SkippedRow};
pub use stats::Dashboard;

pub use sessions::{
    Advance, DEFAULT_SAMPLE_SIZE, Feedback, QueueBuilder, QueueKind, QuizLoopService, QuizSession,
    SessionPhase, SessionProgress, SessionQueue, SessionSummary, SubmitOutcome,
};
