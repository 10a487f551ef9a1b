use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoundError {
    #[error("round must be between {min} and {max}, got {provided}")]
    OutOfRange { provided: u8, min: u8, max: u8 },
}

/// A round number within a session, always in `1..=10`.
///
/// Round 10 is the boss round.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Round(u8);

impl Round {
    pub const FIRST: Round = Round(1);
    pub const BOSS: Round = Round(10);

    /// Total number of rounds in a full session.
    pub const TOTAL: u8 = 10;

    /// Creates a validated round number.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::OutOfRange` outside `1..=10`.
    pub fn new(value: u8) -> Result<Self, RoundError> {
        if (Self::FIRST.0..=Self::BOSS.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RoundError::OutOfRange {
                provided: value,
                min: Self::FIRST.0,
                max: Self::BOSS.0,
            })
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_boss(self) -> bool {
        self == Self::BOSS
    }

    /// The following round, or `None` after the boss round.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1).ok()
    }
}

impl TryFrom<u8> for Round {
    type Error = RoundError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Round> for u8 {
    fn from(round: Round) -> Self {
        round.0
    }
}

impl fmt::Debug for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Round({})", self.0)
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
