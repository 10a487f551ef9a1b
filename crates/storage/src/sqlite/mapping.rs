use quiz_core::model::{Player, PlayerId, PlayerName, PlayerStats};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn u8_from_i64(field: &'static str, v: i64) -> Result<u8, StorageError> {
    u8::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn player_id_from_str(raw: &str) -> Result<PlayerId, StorageError> {
    raw.parse::<PlayerId>().map_err(ser)
}

pub(crate) fn map_player_row(row: &sqlx::sqlite::SqliteRow) -> Result<Player, StorageError> {
    let id = player_id_from_str(&row.try_get::<String, _>("id").map_err(ser)?)?;
    let name = PlayerName::new(row.try_get::<String, _>("name").map_err(ser)?).map_err(ser)?;
    let created_at = row.try_get("created_at").map_err(ser)?;
    let last_played = row.try_get("last_played").map_err(ser)?;

    let stats = PlayerStats {
        games_played: u32_from_i64(
            "games_played",
            row.try_get::<i64, _>("games_played").map_err(ser)?,
        )?,
        total_score: u32_from_i64(
            "total_score",
            row.try_get::<i64, _>("total_score").map_err(ser)?,
        )?,
        best_score: u8_from_i64(
            "best_score",
            row.try_get::<i64, _>("best_score").map_err(ser)?,
        )?,
        boss_levels_completed: u32_from_i64(
            "boss_levels_completed",
            row.try_get::<i64, _>("boss_levels_completed").map_err(ser)?,
        )?,
        perfect_games: u32_from_i64(
            "perfect_games",
            row.try_get::<i64, _>("perfect_games").map_err(ser)?,
        )?,
    };

    Player::from_persisted(id, name, stats, created_at, last_played).map_err(ser)
}
