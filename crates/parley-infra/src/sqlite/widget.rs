//! SQLite widget configuration repository.

use sqlx::Row;

use parley_core::repository::widget::WidgetConfigRepository;
use parley_types::error::RepositoryError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `WidgetConfigRepository`.
pub struct SqliteWidgetConfigRepository {
    pool: DatabasePool,
}

impl SqliteWidgetConfigRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl WidgetConfigRepository for SqliteWidgetConfigRepository {
    async fn save(&self, data: &str) -> Result<i64, RepositoryError> {
        let result = sqlx::query("INSERT INTO widget_configs (data) VALUES (?)")
            .bind(data)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(result.last_insert_rowid())
    }

    async fn get(&self, id: i64) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT data FROM widget_configs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|r| r.try_get::<String, _>("data"))
            .transpose()
            .map_err(|e| RepositoryError::Query(e.to_string()))
    }

    async fn update(&self, id: i64, data: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE widget_configs SET data = ? WHERE id = ?")
            .bind(data)
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM widget_configs WHERE id = ?")
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}
