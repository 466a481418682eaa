use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use quiz_core::model::{CategoryKey, Leaderboard, LeaderboardEntry};

use super::SqliteRepository;
use crate::repository::{LeaderboardRepository, StorageError};

#[async_trait]
impl LeaderboardRepository for SqliteRepository {
    async fn load_board(&self, key: &CategoryKey) -> Result<Leaderboard, StorageError> {
        let row = sqlx::query(
            r"
                SELECT entries
                FROM leaderboards
                WHERE category = ?1
            ",
        )
        .bind(key.storage_key())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(Leaderboard::new());
        };

        let raw: String = row
            .try_get("entries")
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        // Malformed persisted data is not fatal: treat it as no board.
        match serde_json::from_str::<Vec<LeaderboardEntry>>(&raw) {
            Ok(entries) => Ok(Leaderboard::from_entries(entries)),
            Err(e) => {
                tracing::warn!(
                    category = key.storage_key(),
                    error = %e,
                    "discarding malformed leaderboard payload"
                );
                Ok(Leaderboard::new())
            }
        }
    }

    async fn save_board(
        &self,
        key: &CategoryKey,
        board: &Leaderboard,
    ) -> Result<(), StorageError> {
        let entries = serde_json::to_string(board.entries())
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        sqlx::query(
            r"
                INSERT INTO leaderboards (category, entries, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(category) DO UPDATE SET
                    entries = excluded.entries,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(key.storage_key())
        .bind(entries)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
