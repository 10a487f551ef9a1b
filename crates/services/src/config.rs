use std::env;

use crate::error::ConfigError;

pub const DB_URL_VAR: &str = "QUIZ_DB_URL";
pub const SCORING_URL_VAR: &str = "QUIZ_SCORING_URL";
pub const SCORING_TOKEN_VAR: &str = "QUIZ_SCORING_TOKEN";
pub const SEED_VAR: &str = "QUIZ_SEED";

pub const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";

/// Where player statistics live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Memory,
    Sqlite(String),
}

impl DatabaseTarget {
    /// `memory` selects the in-memory store; anything else is a `SQLite` URL.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("memory") {
            return Self::Memory;
        }
        Self::Sqlite(normalize_sqlite_url(trimmed))
    }
}

/// Accepts bare file paths as well as `sqlite:` URLs; creates the file when missing.
#[must_use]
pub fn normalize_sqlite_url(raw: &str) -> String {
    let url = if raw.starts_with("sqlite:") {
        raw.to_string()
    } else {
        format!("sqlite://{raw}")
    };
    if url.contains("mode=") {
        url
    } else if url.contains('?') {
        format!("{url}&mode=rwc")
    } else {
        format!("{url}?mode=rwc")
    }
}

/// Endpoint and credentials of the remote score authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringConfig {
    pub base_url: String,
    pub api_token: Option<String>,
}

/// Runtime configuration for the game services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub database: DatabaseTarget,
    pub scoring: Option<ScoringConfig>,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            database: DatabaseTarget::parse(DEFAULT_DB_URL),
            scoring: None,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Read `QUIZ_DB_URL`, `QUIZ_SCORING_URL`, `QUIZ_SCORING_TOKEN` and `QUIZ_SEED`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is present but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database = lookup(DB_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| DatabaseTarget::parse(DEFAULT_DB_URL), |v| DatabaseTarget::parse(&v));

        let scoring = match lookup(SCORING_URL_VAR) {
            None => None,
            Some(url) if url.trim().is_empty() => {
                return Err(ConfigError::Empty {
                    key: SCORING_URL_VAR,
                });
            }
            Some(url) => Some(ScoringConfig {
                base_url: url.trim().to_string(),
                api_token: lookup(SCORING_TOKEN_VAR).filter(|t| !t.trim().is_empty()),
            }),
        };

        let seed = lookup(SEED_VAR)
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidNumber { key: SEED_VAR, raw })
            })
            .transpose()?;

        Ok(Self {
            database,
            scoring,
            seed,
        })
    }
}
