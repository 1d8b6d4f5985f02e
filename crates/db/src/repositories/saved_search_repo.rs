//! Repository for the `saved_searches` table.

use estate_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::saved_search::{CreateSavedSearch, SavedSearch};

const COLUMNS: &str = "id, user_id, name, filters, alert, created_at, updated_at";

pub struct SavedSearchRepo;

impl SavedSearchRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateSavedSearch,
    ) -> Result<SavedSearch, sqlx::Error> {
        let query = format!(
            "INSERT INTO saved_searches (user_id, name, filters, alert)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SavedSearch>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(Json(&input.filters))
            .bind(input.alert)
            .fetch_one(pool)
            .await
    }

    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<SavedSearch>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM saved_searches WHERE user_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, SavedSearch>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a search owned by `user_id`. Returns `false` if no such row.
    pub async fn delete_for_user(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM saved_searches WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
