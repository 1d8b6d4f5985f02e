//! Repository for the `premium_listings` table.
//!
//! Every write that changes whether a listing is live also updates
//! `properties.is_premium` in the same transaction.

use estate_core::types::{DbId, Money, Timestamp};
use sqlx::PgPool;

use crate::models::premium::{
    ActivatePremiumListing, PremiumCounts, PremiumListing, PremiumNoticeTarget,
    PremiumPropertyStats, UpdatePremiumListing,
};

const COLUMNS: &str = "id, property_id, user_id, plan_type, amount_paid, payment_id, \
                        payment_method, payment_status, payment_reference, payment_details, \
                        start_date, end_date, is_active, reminder_sent_at, created_at, updated_at";

const NOTICE_SELECT: &str = "SELECT l.id AS listing_id, l.property_id, p.title AS property_title,
                                    l.plan_type, l.end_date, u.id AS user_id, u.username, u.email
                             FROM premium_listings l
                             JOIN properties p ON p.id = l.property_id
                             JOIN users u ON u.id = l.user_id";

pub struct PremiumListingRepo;

impl PremiumListingRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PremiumListing>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM premium_listings WHERE id = $1");
        sqlx::query_as::<_, PremiumListing>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_property(
        pool: &PgPool,
        property_id: DbId,
    ) -> Result<Option<PremiumListing>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM premium_listings WHERE property_id = $1");
        sqlx::query_as::<_, PremiumListing>(&query)
            .bind(property_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn has_active(pool: &PgPool, property_id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM premium_listings WHERE property_id = $1 AND is_active)",
        )
        .bind(property_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<PremiumListing>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM premium_listings WHERE user_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, PremiumListing>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// All listings for the admin panel, optionally only active ones.
    pub async fn list(
        pool: &PgPool,
        active_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PremiumListing>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM premium_listings
             WHERE ($1 = false OR is_active)
             ORDER BY end_date
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, PremiumListing>(&query)
            .bind(active_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Create or re-activate the listing of a property and set its premium
    /// flag.
    ///
    /// Returns `None` without changing anything when the property already
    /// has an active listing.
    pub async fn activate(
        pool: &PgPool,
        input: &ActivatePremiumListing,
    ) -> Result<Option<PremiumListing>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO premium_listings (property_id, user_id, plan_type, amount_paid, payment_id,
                                           payment_method, payment_status, payment_reference,
                                           payment_details, start_date, end_date, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, 'completed', $7, $8, $9, $10, true)
             ON CONFLICT ON CONSTRAINT uq_premium_listings_property_id DO UPDATE SET
                user_id = EXCLUDED.user_id,
                plan_type = EXCLUDED.plan_type,
                amount_paid = EXCLUDED.amount_paid,
                payment_id = EXCLUDED.payment_id,
                payment_method = EXCLUDED.payment_method,
                payment_status = 'completed',
                payment_reference = EXCLUDED.payment_reference,
                payment_details = EXCLUDED.payment_details,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                is_active = true,
                reminder_sent_at = NULL
             WHERE premium_listings.is_active = false
             RETURNING {COLUMNS}"
        );
        let listing = sqlx::query_as::<_, PremiumListing>(&query)
            .bind(input.property_id)
            .bind(input.user_id)
            .bind(&input.plan_type)
            .bind(input.amount_paid)
            .bind(&input.payment_id)
            .bind(&input.payment_method)
            .bind(&input.payment_reference)
            .bind(&input.payment_details)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_optional(&mut *tx)
            .await?;

        if listing.is_some() {
            sqlx::query("UPDATE properties SET is_premium = true WHERE id = $1")
                .bind(input.property_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(listing)
    }

    /// Admin patch. Keeps the property flag in step with `is_active`; a new
    /// end date clears the reminder stamp.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePremiumListing,
    ) -> Result<Option<PremiumListing>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE premium_listings SET
                plan_type = COALESCE($2, plan_type),
                payment_status = COALESCE($3, payment_status),
                end_date = COALESCE($4, end_date),
                is_active = COALESCE($5, is_active),
                reminder_sent_at = CASE WHEN $4::timestamptz IS NULL
                                        THEN reminder_sent_at ELSE NULL END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let listing = sqlx::query_as::<_, PremiumListing>(&query)
            .bind(id)
            .bind(&input.plan_type)
            .bind(&input.payment_status)
            .bind(input.end_date)
            .bind(input.is_active)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(listing) = &listing {
            sqlx::query("UPDATE properties SET is_premium = $2 WHERE id = $1")
                .bind(listing.property_id)
                .bind(listing.is_active)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(listing)
    }

    /// Delete a listing and clear the property's premium flag.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let deleted: Option<(DbId,)> =
            sqlx::query_as("DELETE FROM premium_listings WHERE id = $1 RETURNING property_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if let Some((property_id,)) = deleted {
            sqlx::query("UPDATE properties SET is_premium = false WHERE id = $1")
                .bind(property_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(deleted.is_some())
    }

    // -----------------------------------------------------------------------
    // Bulk admin actions
    // -----------------------------------------------------------------------

    pub async fn set_active_bulk(
        pool: &PgPool,
        ids: &[DbId],
        active: bool,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = sqlx::query("UPDATE premium_listings SET is_active = $2 WHERE id = ANY($1)")
            .bind(ids)
            .bind(active)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "UPDATE properties SET is_premium = $2
             WHERE id IN (SELECT property_id FROM premium_listings WHERE id = ANY($1))",
        )
        .bind(ids)
        .bind(active)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    /// Push `end_date` back by `days` on every listed row. The reminder
    /// stamp is cleared so the new end date gets its own reminder.
    pub async fn extend_bulk(pool: &PgPool, ids: &[DbId], days: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE premium_listings
             SET end_date = end_date + make_interval(days => $2::INT),
                 reminder_sent_at = NULL
             WHERE id = ANY($1)",
        )
        .bind(ids)
        .bind(days as i32)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Grant a basic listing to a property on behalf of its owner, unless
    /// one is already active. Returns `None` when skipped.
    pub async fn grant_to_owner(
        pool: &PgPool,
        property_id: DbId,
        plan_type: &str,
        amount: Money,
        payment_id: &str,
        start_date: Timestamp,
        end_date: Timestamp,
    ) -> Result<Option<PremiumListing>, sqlx::Error> {
        let owner: Option<(DbId,)> = sqlx::query_as("SELECT owner_id FROM properties WHERE id = $1")
            .bind(property_id)
            .fetch_optional(pool)
            .await?;
        let Some((owner_id,)) = owner else {
            return Ok(None);
        };

        Self::activate(
            pool,
            &ActivatePremiumListing {
                property_id,
                user_id: owner_id,
                plan_type: plan_type.to_string(),
                amount_paid: amount,
                payment_id: payment_id.to_string(),
                payment_method: "cash".to_string(),
                payment_reference: None,
                payment_details: serde_json::json!({ "granted_by": "admin" }),
                start_date,
                end_date,
            },
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Sweep
    // -----------------------------------------------------------------------

    /// Active listings ending at or before `until`.
    pub async fn list_active_ending_before(
        pool: &PgPool,
        until: Timestamp,
    ) -> Result<Vec<PremiumListing>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM premium_listings
             WHERE is_active AND end_date <= $1
             ORDER BY end_date"
        );
        sqlx::query_as::<_, PremiumListing>(&query)
            .bind(until)
            .fetch_all(pool)
            .await
    }

    pub async fn notice_target(
        pool: &PgPool,
        listing_id: DbId,
    ) -> Result<Option<PremiumNoticeTarget>, sqlx::Error> {
        let query = format!("{NOTICE_SELECT} WHERE l.id = $1");
        sqlx::query_as::<_, PremiumNoticeTarget>(&query)
            .bind(listing_id)
            .fetch_optional(pool)
            .await
    }

    /// Stamp the reminder flag. Returns `false` if it was already set.
    pub async fn mark_reminder_sent(
        pool: &PgPool,
        id: DbId,
        at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE premium_listings SET reminder_sent_at = $2
             WHERE id = $1 AND reminder_sent_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deactivate an ended listing and clear the property flag together.
    /// Returns `false` if the listing was not active or has not ended.
    pub async fn expire(pool: &PgPool, id: DbId, now: Timestamp) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let expired: Option<(DbId,)> = sqlx::query_as(
            "UPDATE premium_listings SET is_active = false
             WHERE id = $1 AND is_active AND end_date <= $2
             RETURNING property_id",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;
        if let Some((property_id,)) = expired {
            sqlx::query("UPDATE properties SET is_premium = false WHERE id = $1")
                .bind(property_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(expired.is_some())
    }

    // -----------------------------------------------------------------------
    // Reporting
    // -----------------------------------------------------------------------

    pub async fn counts(pool: &PgPool, now: Timestamp) -> Result<PremiumCounts, sqlx::Error> {
        sqlx::query_as::<_, PremiumCounts>(
            "SELECT
                COUNT(*) FILTER (WHERE is_active) AS active,
                COUNT(*) FILTER (WHERE NOT is_active) AS inactive,
                COUNT(*) FILTER (WHERE is_active AND end_date > $1
                                 AND end_date <= $1 + INTERVAL '7 days') AS expiring_soon
             FROM premium_listings",
        )
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Active listings ending within `(now, until]`, soonest first.
    pub async fn upcoming_expirations(
        pool: &PgPool,
        now: Timestamp,
        until: Timestamp,
        limit: i64,
    ) -> Result<Vec<PremiumNoticeTarget>, sqlx::Error> {
        let query = format!(
            "{NOTICE_SELECT}
             WHERE l.is_active AND l.end_date > $1 AND l.end_date <= $2
             ORDER BY l.end_date
             LIMIT $3"
        );
        sqlx::query_as::<_, PremiumNoticeTarget>(&query)
            .bind(now)
            .bind(until)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Views and inquiries for each actively promoted property of a user.
    pub async fn property_stats_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<PremiumPropertyStats>, sqlx::Error> {
        sqlx::query_as::<_, PremiumPropertyStats>(
            "SELECT p.id AS property_id, p.title, l.plan_type, l.end_date,
                    (SELECT COUNT(*) FROM page_views v WHERE v.property_id = p.id) AS views,
                    (SELECT COUNT(*) FROM contact_inquiries c WHERE c.property_id = p.id) AS inquiries
             FROM premium_listings l
             JOIN properties p ON p.id = l.property_id
             WHERE l.user_id = $1 AND l.is_active
             ORDER BY l.end_date",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
