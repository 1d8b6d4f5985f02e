//! Repository for the `promo_codes` table.

use estate_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::promo_code::{CreatePromoCode, PromoCode, UpdatePromoCode};

const COLUMNS: &str = "id, code, discount_type, discount_value, valid_from, valid_until, \
                        max_uses, times_used, is_active, created_by, created_at, updated_at";

pub struct PromoCodeRepo;

impl PromoCodeRepo {
    pub async fn create(pool: &PgPool, input: &CreatePromoCode) -> Result<PromoCode, sqlx::Error> {
        let query = format!(
            "INSERT INTO promo_codes (code, discount_type, discount_value, valid_from,
                                      valid_until, max_uses, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PromoCode>(&query)
            .bind(&input.code)
            .bind(&input.discount_type)
            .bind(input.discount_value)
            .bind(input.valid_from)
            .bind(input.valid_until)
            .bind(input.max_uses)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<PromoCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM promo_codes WHERE code = $1");
        sqlx::query_as::<_, PromoCode>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<PromoCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM promo_codes ORDER BY created_at DESC");
        sqlx::query_as::<_, PromoCode>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePromoCode,
    ) -> Result<Option<PromoCode>, sqlx::Error> {
        let query = format!(
            "UPDATE promo_codes SET
                valid_until = COALESCE($2, valid_until),
                max_uses = COALESCE($3, max_uses),
                is_active = COALESCE($4, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PromoCode>(&query)
            .bind(id)
            .bind(input.valid_until)
            .bind(input.max_uses)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Count one use of `code` if it is still valid at `now`.
    ///
    /// The validity re-check and the increment are a single statement, so
    /// concurrent redemptions can never push `times_used` past `max_uses`.
    /// Returns `false` when the code was not redeemable.
    pub async fn redeem(pool: &PgPool, code: &str, now: Timestamp) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE promo_codes SET times_used = times_used + 1
             WHERE code = $1
               AND is_active
               AND valid_from <= $2 AND $2 <= valid_until
               AND (max_uses IS NULL OR times_used < max_uses)",
        )
        .bind(code)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
