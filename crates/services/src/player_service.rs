use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use quiz_core::Clock;
use quiz_core::model::{GameResult, Player, PlayerId, PlayerName, PlayerStats};
use storage::repository::{PlayerRepository, StorageError};

use crate::error::PlayerServiceError;

/// Read-only statistics view with the derived average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStatsView {
    pub name: String,
    pub games_played: u32,
    pub total_score: u32,
    pub best_score: u8,
    pub boss_levels_completed: u32,
    pub perfect_games: u32,
    pub average_score: f64,
}

impl PlayerStatsView {
    #[must_use]
    pub fn from_player(player: &Player) -> Self {
        let PlayerStats {
            games_played,
            total_score,
            best_score,
            boss_levels_completed,
            perfect_games,
        } = player.stats().clone();
        Self {
            name: player.name().as_str().to_string(),
            games_played,
            total_score,
            best_score,
            boss_levels_completed,
            perfect_games,
            average_score: player.stats().average_score(),
        }
    }
}

/// Registers players and folds finished games into their statistics.
#[derive(Clone)]
pub struct PlayerService {
    clock: Clock,
    players: Arc<dyn PlayerRepository>,
}

impl PlayerService {
    #[must_use]
    pub fn new(clock: Clock, players: Arc<dyn PlayerRepository>) -> Self {
        Self { clock, players }
    }

    /// Return the player with this name, registering them on first sight.
    ///
    /// Losing a registration race to a concurrent caller yields the player
    /// that caller stored.
    ///
    /// # Errors
    ///
    /// Returns `PlayerServiceError::Player` for a blank name and
    /// `PlayerServiceError::Storage` on repository failures.
    pub async fn ensure_player(&self, name: &str) -> Result<Player, PlayerServiceError> {
        let name = PlayerName::new(name)?;
        if let Some(existing) = self.players.find_player_by_name(&name).await? {
            return Ok(existing);
        }
        let player = Player::new(PlayerId::generate(), name.clone(), self.clock.now());
        match self.players.upsert_player(&player).await {
            Ok(()) => {
                info!(player_id = %player.id(), name = %player.name(), "player registered");
                Ok(player)
            }
            Err(StorageError::Conflict) => {
                debug!(name = %name, "player registered concurrently; reloading");
                let winner = self
                    .players
                    .find_player_by_name(&name)
                    .await?
                    .ok_or(StorageError::Conflict)?;
                Ok(winner)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Fold one finished game into the player's stored statistics.
    ///
    /// # Errors
    ///
    /// Returns `PlayerServiceError::Storage` if the player is missing or the
    /// write fails, and `PlayerServiceError::Player` for an impossible score.
    pub async fn record_result(
        &self,
        player_id: PlayerId,
        result: GameResult,
    ) -> Result<Player, PlayerServiceError> {
        let mut player = self.players.get_player(player_id).await?;
        player.record_game(result, self.clock.now())?;
        self.players.upsert_player(&player).await?;
        info!(
            player_id = %player_id,
            score = result.score,
            boss_played = result.boss_played,
            games_played = player.stats().games_played,
            "game recorded"
        );
        Ok(player)
    }

    /// Statistics for a player by name; `Ok(None)` for unknown names.
    ///
    /// # Errors
    ///
    /// Returns `PlayerServiceError::Player` for a blank name and
    /// `PlayerServiceError::Storage` on repository failures.
    pub async fn stats_by_name(
        &self,
        name: &str,
    ) -> Result<Option<PlayerStatsView>, PlayerServiceError> {
        let name = PlayerName::new(name)?;
        let player = self.players.find_player_by_name(&name).await?;
        Ok(player.as_ref().map(PlayerStatsView::from_player))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quiz_core::time::fixed_now;
    use std::sync::Mutex;
    use storage::repository::InMemoryRepository;

    fn service() -> PlayerService {
        PlayerService::new(
            Clock::fixed(fixed_now()),
            Arc::new(InMemoryRepository::new()),
        )
    }

    #[tokio::test]
    async fn ensure_player_reuses_known_names() {
        let service = service();
        let first = service.ensure_player("Ann").await.unwrap();
        let again = service.ensure_player("  Ann ").await.unwrap();
        assert_eq!(first.id(), again.id());
        assert_eq!(first.created_at(), fixed_now());
    }

    /// Hides the stored player from the first lookup, as if another caller
    /// registered the name between our lookup and our insert.
    struct LateWriter {
        inner: InMemoryRepository,
        hidden_once: Mutex<bool>,
    }

    #[async_trait]
    impl PlayerRepository for LateWriter {
        async fn upsert_player(&self, player: &Player) -> Result<(), StorageError> {
            self.inner.upsert_player(player).await
        }

        async fn get_player(&self, id: PlayerId) -> Result<Player, StorageError> {
            self.inner.get_player(id).await
        }

        async fn find_player_by_name(
            &self,
            name: &PlayerName,
        ) -> Result<Option<Player>, StorageError> {
            let first = std::mem::replace(&mut *self.hidden_once.lock().unwrap(), false);
            if first {
                return Ok(None);
            }
            self.inner.find_player_by_name(name).await
        }
    }

    #[tokio::test]
    async fn ensure_player_adopts_the_winner_of_a_registration_race() {
        let inner = InMemoryRepository::new();
        let winner = Player::new(
            PlayerId::generate(),
            PlayerName::new("Ann").unwrap(),
            fixed_now(),
        );
        inner.upsert_player(&winner).await.unwrap();
        let service = PlayerService::new(
            Clock::fixed(fixed_now()),
            Arc::new(LateWriter {
                inner,
                hidden_once: Mutex::new(true),
            }),
        );

        let player = service.ensure_player("Ann").await.unwrap();
        assert_eq!(player.id(), winner.id());
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let err = service().ensure_player(" ").await.unwrap_err();
        assert!(matches!(err, PlayerServiceError::Player(_)));
    }

    #[tokio::test]
    async fn record_result_updates_stats_and_average() {
        let service = service();
        let player = service.ensure_player("Ann").await.unwrap();
        service
            .record_result(
                player.id(),
                GameResult {
                    score: 10,
                    boss_played: true,
                },
            )
            .await
            .unwrap();
        service
            .record_result(
                player.id(),
                GameResult {
                    score: 3,
                    boss_played: false,
                },
            )
            .await
            .unwrap();

        let view = service.stats_by_name("Ann").await.unwrap().unwrap();
        assert_eq!(view.games_played, 2);
        assert_eq!(view.total_score, 13);
        assert_eq!(view.best_score, 10);
        assert_eq!(view.perfect_games, 1);
        assert_eq!(view.boss_levels_completed, 1);
        assert!((view.average_score - 6.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn unknown_player_has_no_stats() {
        assert!(service().stats_by_name("Nobody").await.unwrap().is_none());
    }
}
