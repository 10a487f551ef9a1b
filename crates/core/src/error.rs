use thiserror::Error;

use crate::model::{GamePhase, PlayerError, RoundError};

/// Bad caller input, rejected before any session state changes.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum InvalidInput {
    #[error(transparent)]
    Player(#[from] PlayerError),
    #[error(transparent)]
    Round(#[from] RoundError),
    #[error("elapsed seconds must be finite and non-negative, got {0}")]
    ElapsedSeconds(f64),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    #[error("cannot {operation} while the session is {phase}")]
    InvalidState {
        operation: &'static str,
        phase: GamePhase,
    },

    #[error("could not find distinct distractors after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },
}

impl From<PlayerError> for QuizError {
    fn from(err: PlayerError) -> Self {
        Self::InvalidInput(InvalidInput::Player(err))
    }
}

impl From<RoundError> for QuizError {
    fn from(err: RoundError) -> Self {
        Self::InvalidInput(InvalidInput::Round(err))
    }
}
