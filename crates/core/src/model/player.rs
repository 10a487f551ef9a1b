use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::PlayerId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlayerError {
    #[error("player name cannot be empty")]
    EmptyName,

    #[error("score {0} is outside 0..=10")]
    InvalidScore(u8),

    #[error("best score ({best}) exceeds the maximum possible score")]
    InvalidBestScore { best: u8 },
}

//
// ─── NAME ──────────────────────────────────────────────────────────────────────
//

/// A trimmed, non-empty player name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerName(String);

impl PlayerName {
    /// # Errors
    ///
    /// Returns `PlayerError::EmptyName` for empty or whitespace-only input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PlayerError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PlayerError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlayerName {
    type Error = PlayerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlayerName> for String {
    fn from(name: PlayerName) -> Self {
        name.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ─── GAME RESULT ───────────────────────────────────────────────────────────────
//

/// Final outcome of one session, as fed into player statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub score: u8,
    /// The boss round was reached and answered, right or wrong.
    pub boss_played: bool,
}

impl GameResult {
    /// Score of a game where every round was answered correctly.
    pub const PERFECT_SCORE: u8 = 10;

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.score == Self::PERFECT_SCORE
    }
}

//
// ─── STATS ─────────────────────────────────────────────────────────────────────
//

/// Lifetime statistics for a player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub games_played: u32,
    pub total_score: u32,
    pub best_score: u8,
    pub boss_levels_completed: u32,
    pub perfect_games: u32,
}

impl PlayerStats {
    /// Folds one finished game into the totals.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::InvalidScore` if the score is above 10.
    pub fn record(&mut self, result: GameResult) -> Result<(), PlayerError> {
        if result.score > GameResult::PERFECT_SCORE {
            return Err(PlayerError::InvalidScore(result.score));
        }
        self.games_played = self.games_played.saturating_add(1);
        self.total_score = self.total_score.saturating_add(u32::from(result.score));
        self.best_score = self.best_score.max(result.score);
        if result.is_perfect() {
            self.perfect_games = self.perfect_games.saturating_add(1);
        }
        if result.boss_played {
            self.boss_levels_completed = self.boss_levels_completed.saturating_add(1);
        }
        Ok(())
    }

    /// Mean score per game rounded to two decimals; `0.0` before the first game.
    #[must_use]
    pub fn average_score(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        let avg = f64::from(self.total_score) / f64::from(self.games_played);
        (avg * 100.0).round() / 100.0
    }
}

//
// ─── PLAYER ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    name: PlayerName,
    stats: PlayerStats,
    created_at: DateTime<Utc>,
    last_played: Option<DateTime<Utc>>,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: PlayerName, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            stats: PlayerStats::default(),
            created_at,
            last_played: None,
        }
    }

    /// Rehydrate a player from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::InvalidBestScore` if the stored best score is impossible.
    pub fn from_persisted(
        id: PlayerId,
        name: PlayerName,
        stats: PlayerStats,
        created_at: DateTime<Utc>,
        last_played: Option<DateTime<Utc>>,
    ) -> Result<Self, PlayerError> {
        if stats.best_score > GameResult::PERFECT_SCORE {
            return Err(PlayerError::InvalidBestScore {
                best: stats.best_score,
            });
        }
        Ok(Self {
            id,
            name,
            stats,
            created_at,
            last_played,
        })
    }

    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &PlayerName {
        &self.name
    }

    #[must_use]
    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn last_played(&self) -> Option<DateTime<Utc>> {
        self.last_played
    }

    /// Record a finished game and stamp `last_played`.
    ///
    /// # Errors
    ///
    /// Propagates `PlayerError::InvalidScore`.
    pub fn record_game(
        &mut self,
        result: GameResult,
        played_at: DateTime<Utc>,
    ) -> Result<(), PlayerError> {
        self.stats.record(result)?;
        self.last_played = Some(played_at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn name_is_trimmed_and_required() {
        assert_eq!(PlayerName::new("  Ann ").unwrap().as_str(), "Ann");
        assert_eq!(PlayerName::new("   ").unwrap_err(), PlayerError::EmptyName);
        assert_eq!(PlayerName::new("").unwrap_err(), PlayerError::EmptyName);
    }

    #[test]
    fn stats_accumulate_best_perfect_and_boss() {
        let mut stats = PlayerStats::default();
        stats
            .record(GameResult {
                score: 4,
                boss_played: false,
            })
            .unwrap();
        stats
            .record(GameResult {
                score: 10,
                boss_played: true,
            })
            .unwrap();
        stats
            .record(GameResult {
                score: 9,
                boss_played: true,
            })
            .unwrap();

        assert_eq!(stats.games_played, 3);
        assert_eq!(stats.total_score, 23);
        assert_eq!(stats.best_score, 10);
        assert_eq!(stats.perfect_games, 1);
        assert_eq!(stats.boss_levels_completed, 2);
        assert!((stats.average_score() - 7.67).abs() < 1e-9);
    }

    #[test]
    fn average_rounds_to_two_decimals() {
        let stats = PlayerStats {
            games_played: 3,
            total_score: 10,
            ..PlayerStats::default()
        };
        assert!((stats.average_score() - 3.33).abs() < 1e-9);
        assert!(PlayerStats::default().average_score().abs() < f64::EPSILON);
    }

    #[test]
    fn record_rejects_impossible_score() {
        let mut player = Player::new(
            PlayerId::generate(),
            PlayerName::new("Ann").unwrap(),
            fixed_now(),
        );
        let err = player
            .record_game(
                GameResult {
                    score: 11,
                    boss_played: false,
                },
                fixed_now(),
            )
            .unwrap_err();
        assert_eq!(err, PlayerError::InvalidScore(11));
        assert_eq!(player.stats().games_played, 0);
        assert_eq!(player.last_played(), None);
    }
}
