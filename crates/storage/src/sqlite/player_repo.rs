use async_trait::async_trait;
use quiz_core::model::{Player, PlayerId, PlayerName};

use super::SqliteRepository;
use super::mapping::map_player_row;
use crate::repository::{PlayerRepository, StorageError};

const SELECT_PLAYER: &str = r"
    SELECT
        id,
        name,
        created_at,
        last_played,
        games_played,
        total_score,
        best_score,
        boss_levels_completed,
        perfect_games
    FROM players
";

fn write_err(err: sqlx::Error) -> StorageError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        _ => StorageError::Connection(err.to_string()),
    }
}

#[async_trait]
impl PlayerRepository for SqliteRepository {
    async fn upsert_player(&self, player: &Player) -> Result<(), StorageError> {
        let stats = player.stats();
        sqlx::query(
            r"
            INSERT INTO players (
                id,
                name,
                created_at,
                last_played,
                games_played,
                total_score,
                best_score,
                boss_levels_completed,
                perfect_games
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                last_played = excluded.last_played,
                games_played = excluded.games_played,
                total_score = excluded.total_score,
                best_score = excluded.best_score,
                boss_levels_completed = excluded.boss_levels_completed,
                perfect_games = excluded.perfect_games
            ",
        )
        .bind(player.id().to_string())
        .bind(player.name().as_str())
        .bind(player.created_at())
        .bind(player.last_played())
        .bind(i64::from(stats.games_played))
        .bind(i64::from(stats.total_score))
        .bind(i64::from(stats.best_score))
        .bind(i64::from(stats.boss_levels_completed))
        .bind(i64::from(stats.perfect_games))
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(())
    }

    async fn get_player(&self, id: PlayerId) -> Result<Player, StorageError> {
        let row = sqlx::query(&format!("{SELECT_PLAYER} WHERE id = ?1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .ok_or(StorageError::NotFound)?;
        map_player_row(&row)
    }

    async fn find_player_by_name(
        &self,
        name: &PlayerName,
    ) -> Result<Option<Player>, StorageError> {
        let row = sqlx::query(&format!("{SELECT_PLAYER} WHERE name = ?1"))
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        row.as_ref().map(map_player_row).transpose()
    }
}
