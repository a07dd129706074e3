#![forbid(unsafe_code)]

pub mod record;
pub mod repository;
pub mod sqlite;

pub use record::{QuestionRecord, STATE_KEY, StateRecord, StatsRecord};
pub use repository::{InMemoryRepository, KeyValueStore, Storage, StorageError};
