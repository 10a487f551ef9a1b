use std::sync::Arc;

use quiz_core::{Clock, SessionMachine};
use storage::repository::Storage;

use crate::config::{DatabaseTarget, GameConfig};
use crate::error::AppServicesError;
use crate::game_service::GameService;
use crate::player_service::PlayerService;
use crate::scoring::{HttpScoreAuthority, ScoreAuthority};

/// Assembles app-facing services from a `GameConfig`.
#[derive(Clone)]
pub struct AppServices {
    games: Arc<GameService>,
    players: Arc<PlayerService>,
    remote_scoring: bool,
}

impl AppServices {
    /// Build services for the configured storage and score authority.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if `SQLite` initialization fails.
    pub async fn from_config(config: &GameConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = match &config.database {
            DatabaseTarget::Memory => Storage::in_memory(),
            DatabaseTarget::Sqlite(url) => Storage::sqlite(url).await?,
        };
        Ok(Self::assemble(storage, config, clock))
    }

    /// Build services over an already opened `Storage`.
    #[must_use]
    pub fn assemble(storage: Storage, config: &GameConfig, clock: Clock) -> Self {
        let players = PlayerService::new(clock, Arc::clone(&storage.players));

        let machine = match config.seed {
            Some(seed) => SessionMachine::seeded(seed),
            None => SessionMachine::new(),
        }
        .with_clock(clock);

        let mut games = GameService::new(machine, players.clone());
        let authority = HttpScoreAuthority::new(config.scoring.clone());
        let remote_scoring = authority.enabled();
        if remote_scoring {
            let authority: Arc<dyn ScoreAuthority> = Arc::new(authority);
            games = games.with_authority(authority);
        }

        Self {
            games: Arc::new(games),
            players: Arc::new(players),
            remote_scoring,
        }
    }

    #[must_use]
    pub fn games(&self) -> Arc<GameService> {
        Arc::clone(&self.games)
    }

    #[must_use]
    pub fn players(&self) -> Arc<PlayerService> {
        Arc::clone(&self.players)
    }

    #[must_use]
    pub fn remote_scoring(&self) -> bool {
        self.remote_scoring
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use quiz_core::time::fixed_now;

    #[tokio::test]
    async fn memory_config_needs_no_database() {
        let config = GameConfig {
            database: DatabaseTarget::Memory,
            scoring: None,
            seed: Some(7),
        };
        let services = AppServices::from_config(&config, Clock::fixed(fixed_now()))
            .await
            .unwrap();
        assert!(!services.remote_scoring());

        let session = services.games().start_game("Ann").await.unwrap();
        assert_eq!(session.started_at(), fixed_now());
        assert_eq!(services.games().live_sessions().unwrap(), 1);
    }

    #[test]
    fn scoring_url_enables_remote_authority() {
        let config = GameConfig {
            database: DatabaseTarget::Memory,
            scoring: Some(ScoringConfig {
                base_url: "http://scores.local".into(),
                api_token: None,
            }),
            seed: None,
        };
        let services = AppServices::assemble(Storage::in_memory(), &config, Clock::default());
        assert!(services.remote_scoring());
    }
}
