//! Repository for the `user_sessions` table.

use estate_core::types::DbId;
use sqlx::PgPool;

use crate::models::session::{NewRefreshSession, RefreshSession};

const COLUMNS: &str = "id, user_id, token_hash, expires_at, is_revoked, replaced_by, \
                        user_agent, ip_address, created_at, updated_at";

const INSERT: &str = "INSERT INTO user_sessions (user_id, token_hash, expires_at, user_agent, ip_address)
                      VALUES ($1, $2, $3, $4, $5)";

pub struct SessionRepo;

impl SessionRepo {
    pub async fn create(
        pool: &PgPool,
        input: &NewRefreshSession,
    ) -> Result<RefreshSession, sqlx::Error> {
        let query = format!("{INSERT} RETURNING {COLUMNS}");
        sqlx::query_as::<_, RefreshSession>(&query)
            .bind(input.user_id)
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .bind(&input.user_agent)
            .bind(&input.ip_address)
            .fetch_one(pool)
            .await
    }

    /// Look up a session by token hash whatever its state, so the caller
    /// can tell an expired token from a replayed one.
    pub async fn find_by_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_sessions WHERE token_hash = $1");
        sqlx::query_as::<_, RefreshSession>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Replace session `old_id` with a new one in a single transaction.
    ///
    /// Returns `None` when `old_id` was already revoked, e.g. by a
    /// concurrent refresh with the same token.
    pub async fn rotate(
        pool: &PgPool,
        old_id: DbId,
        next: &NewRefreshSession,
    ) -> Result<Option<RefreshSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("{INSERT} RETURNING {COLUMNS}");
        let created = sqlx::query_as::<_, RefreshSession>(&query)
            .bind(next.user_id)
            .bind(&next.token_hash)
            .bind(next.expires_at)
            .bind(&next.user_agent)
            .bind(&next.ip_address)
            .fetch_one(&mut *tx)
            .await?;

        let revoked = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true, replaced_by = $2
             WHERE id = $1 AND NOT is_revoked",
        )
        .bind(old_id)
        .bind(created.id)
        .execute(&mut *tx)
        .await?;

        if revoked.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }
        tx.commit().await?;
        Ok(Some(created))
    }

    /// Revoke every live session of a user. Returns the count revoked.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true WHERE user_id = $1 AND NOT is_revoked",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
