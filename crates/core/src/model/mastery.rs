use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MasteryError {
    #[error("mastery level must be between -1 and 3, got {0}")]
    OutOfRange(i64),
}

/// Per-question confidence score.
///
/// - `-1`: answered incorrectly last time (currently missed)
/// - `0`: unseen or neutral
/// - `1..=3`: increasing confidence; `3` is mastered
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i8")]
pub struct MasteryLevel(i8);

impl MasteryLevel {
    pub const MISSED: Self = Self(-1);
    pub const UNSEEN: Self = Self(0);
    pub const MASTERED: Self = Self(3);

    /// # Errors
    ///
    /// Returns `MasteryError::OutOfRange` outside `-1..=3`.
    pub fn new(value: i64) -> Result<Self, MasteryError> {
        match value {
            -1..=3 => Ok(Self(i8::try_from(value).map_err(|_| MasteryError::OutOfRange(value))?)),
            _ => Err(MasteryError::OutOfRange(value)),
        }
    }

    #[must_use]
    pub fn value(self) -> i8 {
        self.0
    }

    /// One step up, capped at `MASTERED`.
    #[must_use]
    pub fn promote(self) -> Self {
        Self((self.0 + 1).min(Self::MASTERED.0))
    }

    #[must_use]
    pub fn is_missed(self) -> bool {
        self.0 < 0
    }

    /// Counts toward the completion rate.
    #[must_use]
    pub fn is_learned(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub fn is_mastered(self) -> bool {
        self.0 >= Self::MASTERED.0
    }
}

impl TryFrom<i64> for MasteryLevel {
    type Error = MasteryError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MasteryLevel> for i8 {
    fn from(level: MasteryLevel) -> Self {
        level.0
    }
}

impl fmt::Debug for MasteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasteryLevel({})", self.0)
    }
}

impl fmt::Display for MasteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
