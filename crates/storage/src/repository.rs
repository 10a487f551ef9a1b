use async_trait::async_trait;
use quiz_core::model::{Player, PlayerId, PlayerName};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for players and their lifetime statistics.
///
/// Player names are unique; ids are stable.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Insert a new player or overwrite the stored stats of an existing one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if another player already owns the name.
    async fn upsert_player(&self, player: &Player) -> Result<(), StorageError>;

    /// Fetch a player by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_player(&self, id: PlayerId) -> Result<Player, StorageError>;

    /// Look a player up by name. `Ok(None)` when nobody has that name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn find_player_by_name(&self, name: &PlayerName)
    -> Result<Option<Player>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    players: Arc<Mutex<HashMap<PlayerId, Player>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            players: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl PlayerRepository for InMemoryRepository {
    async fn upsert_player(&self, player: &Player) -> Result<(), StorageError> {
        let mut guard = self
            .players
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let name_taken = guard
            .values()
            .any(|p| p.name() == player.name() && p.id() != player.id());
        if name_taken {
            return Err(StorageError::Conflict);
        }
        guard.insert(player.id(), player.clone());
        Ok(())
    }

    async fn get_player(&self, id: PlayerId) -> Result<Player, StorageError> {
        let guard = self
            .players
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn find_player_by_name(
        &self,
        name: &PlayerName,
    ) -> Result<Option<Player>, StorageError> {
        let guard = self
            .players
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.values().find(|p| p.name() == name).cloned())
    }
}

/// Repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub players: Arc<dyn PlayerRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let players: Arc<dyn PlayerRepository> = Arc::new(InMemoryRepository::new());
        Self { players }
    }
}
