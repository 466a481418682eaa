use async_trait::async_trait;
use quiz_core::model::{CategoryKey, Leaderboard, PlayerName};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for per-category leaderboards.
///
/// The store behaves like a key-value map from category key to a full
/// top-10 list: reads return the whole board, writes overwrite it.
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Load the board stored under `key`.
    ///
    /// Missing or malformed stored data loads as an empty board; only
    /// infrastructure failures are errors.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn load_board(&self, key: &CategoryKey) -> Result<Leaderboard, StorageError>;

    /// Overwrite the board stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the board cannot be stored.
    async fn save_board(&self, key: &CategoryKey, board: &Leaderboard)
    -> Result<(), StorageError>;
}

/// Repository contract for the single stored player profile.
#[async_trait]
pub trait PlayerProfileRepository: Send + Sync {
    /// Fetch the saved player name, if one was ever stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn load_player_name(&self) -> Result<Option<PlayerName>, StorageError>;

    /// Persist the player name for future sessions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the name cannot be stored.
    async fn save_player_name(&self, name: &PlayerName) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    boards: Arc<Mutex<HashMap<String, Leaderboard>>>,
    player: Arc<Mutex<Option<PlayerName>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaderboardRepository for InMemoryRepository {
    async fn load_board(&self, key: &CategoryKey) -> Result<Leaderboard, StorageError> {
        let guard = self
            .boards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key.storage_key()).cloned().unwrap_or_default())
    }

    async fn save_board(
        &self,
        key: &CategoryKey,
        board: &Leaderboard,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .boards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.storage_key().to_owned(), board.clone());
        Ok(())
    }
}

#[async_trait]
impl PlayerProfileRepository for InMemoryRepository {
    async fn load_player_name(&self) -> Result<Option<PlayerName>, StorageError> {
        let guard = self
            .player
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_player_name(&self, name: &PlayerName) -> Result<(), StorageError> {
        let mut guard = self
            .player
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(name.clone());
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub leaderboards: Arc<dyn LeaderboardRepository>,
    pub players: Arc<dyn PlayerProfileRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let leaderboards: Arc<dyn LeaderboardRepository> = Arc::new(repo.clone());
        let players: Arc<dyn PlayerProfileRepository> = Arc::new(repo);
        Self {
            leaderboards,
            players,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::LeaderboardEntry;
    use quiz_core::time::fixed_now;

    #[tokio::test]
    async fn missing_board_loads_empty() {
        let repo = InMemoryRepository::new();
        let board = repo.load_board(&CategoryKey::AllCategories).await.unwrap();
        assert!(board.is_empty());
    }

    #[tokio::test]
    async fn board_round_trips_per_key() {
        let repo = InMemoryRepository::new();
        let mut board = Leaderboard::new();
        board.insert(LeaderboardEntry::new(
            &PlayerName::new("Awa"),
            7,
            10,
            fixed_now(),
        ));

        let history = CategoryKey::named("History");
        repo.save_board(&history, &board).await.unwrap();

        let loaded = repo.load_board(&history).await.unwrap();
        assert_eq!(loaded, board);

        let other = repo.load_board(&CategoryKey::named("Music")).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn player_name_round_trips() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_player_name().await.unwrap().is_none());

        let name = PlayerName::new("Moussa");
        repo.save_player_name(&name).await.unwrap();
        assert_eq!(repo.load_player_name().await.unwrap(), Some(name));
    }
}
