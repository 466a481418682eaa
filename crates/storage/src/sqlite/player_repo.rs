use async_trait::async_trait;
use sqlx::Row;

use quiz_core::model::PlayerName;

use super::SqliteRepository;
use crate::repository::{PlayerProfileRepository, StorageError};

#[async_trait]
impl PlayerProfileRepository for SqliteRepository {
    async fn load_player_name(&self) -> Result<Option<PlayerName>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT name
                FROM player_profile
                WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let name: String = row
            .try_get("name")
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(Some(PlayerName::new(name)))
    }

    async fn save_player_name(&self, name: &PlayerName) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO player_profile (id, name)
                VALUES (1, ?1)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name
            ",
        )
        .bind(name.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
