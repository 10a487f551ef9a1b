//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::QuizError;
use quiz_core::model::{PlayerError, SessionId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors talking to the remote score authority.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScoringError {
    #[error("score authority is not configured")]
    Disabled,
    #[error("score authority returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `PlayerService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlayerServiceError {
    #[error(transparent)]
    Player(#[from] PlayerError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `GameService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GameServiceError {
    #[error("game session {0} not found")]
    SessionNotFound(SessionId),
    #[error("session registry lock poisoned")]
    LockPoisoned,
    #[error("score authority disagreed on {field}: local {local}, remote {remote}")]
    ScoreMismatch {
        field: &'static str,
        local: String,
        remote: String,
    },
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Player(#[from] PlayerServiceError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

/// Errors reading configuration from the environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{key} must be an unsigned integer, got {raw:?}")]
    InvalidNumber { key: &'static str, raw: String },
    #[error("{key} cannot be empty")]
    Empty { key: &'static str },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
