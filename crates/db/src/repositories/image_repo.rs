//! Repository for the `images` table.

use estate_core::duplicates::DuplicateMark;
use estate_core::moderation::ModerationState;
use estate_core::types::DbId;
use sqlx::PgPool;

use crate::models::image::{CreateImage, Image, ImageStats, ImageWithProperty};

const COLUMNS: &str = "id, property_id, file_path, caption, status, content_hash, is_duplicate, \
                        duplicate_of, file_size, width, height, moderated_by, moderated_at, \
                        moderation_notes, flagged_at, flag_reason, deleted_at, deleted_by, \
                        deletion_reason, status_before_delete, created_at, updated_at";

/// Same columns qualified with the `i` alias, for joins.
const JOINED_COLUMNS: &str = "i.id, i.property_id, i.file_path, i.caption, i.status, \
                        i.content_hash, i.is_duplicate, i.duplicate_of, i.file_size, i.width, \
                        i.height, i.moderated_by, i.moderated_at, i.moderation_notes, \
                        i.flagged_at, i.flag_reason, i.deleted_at, i.deleted_by, \
                        i.deletion_reason, i.status_before_delete, i.created_at, i.updated_at";

pub struct ImageRepo;

impl ImageRepo {
    pub async fn create(pool: &PgPool, input: &CreateImage) -> Result<Image, sqlx::Error> {
        let query = format!(
            "INSERT INTO images (property_id, file_path, caption, content_hash, is_duplicate,
                                 duplicate_of, file_size, width, height)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(input.property_id)
            .bind(&input.file_path)
            .bind(&input.caption)
            .bind(&input.content_hash)
            .bind(input.is_duplicate)
            .bind(input.duplicate_of)
            .bind(input.file_size)
            .bind(input.width)
            .bind(input.height)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Image>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM images WHERE id = $1");
        sqlx::query_as::<_, Image>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Image>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM images WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, Image>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Images of a property. Deleted images are hidden unless requested.
    pub async fn list_for_property(
        pool: &PgPool,
        property_id: DbId,
        include_deleted: bool,
    ) -> Result<Vec<Image>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM images
             WHERE property_id = $1 AND ($2 OR status <> 'deleted')
             ORDER BY id"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(property_id)
            .bind(include_deleted)
            .fetch_all(pool)
            .await
    }

    /// Lowest-id image carrying `hash`; the master of its duplicate group.
    pub async fn find_master_by_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<Image>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM images WHERE content_hash = $1 ORDER BY id LIMIT 1"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Review queue: images in the given statuses, oldest first, with the
    /// owning property.
    pub async fn list_by_status(
        pool: &PgPool,
        statuses: &[String],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ImageWithProperty>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}, p.title AS property_title, p.owner_id
             FROM images i
             JOIN properties p ON p.id = i.property_id
             WHERE i.status = ANY($1)
             ORDER BY i.created_at
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ImageWithProperty>(&query)
            .bind(statuses)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Pending and approved images for the fake-image scan, oldest first.
    /// `limit` applies after the status filter.
    pub async fn list_scannable(pool: &PgPool, limit: Option<i64>) -> Result<Vec<Image>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM images
             WHERE status IN ('pending', 'approved')
             ORDER BY id
             LIMIT $1"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// `(id, content_hash)` for every hashed image.
    pub async fn list_hashes(pool: &PgPool) -> Result<Vec<(DbId, String)>, sqlx::Error> {
        sqlx::query_as("SELECT id, content_hash FROM images WHERE content_hash IS NOT NULL ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Stored paths of every image, for orphan cleanup.
    pub async fn list_file_paths(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT file_path FROM images")
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Persist a moderation transition.
    pub async fn save_moderation(
        pool: &PgPool,
        id: DbId,
        state: &ModerationState,
    ) -> Result<Option<Image>, sqlx::Error> {
        let query = format!(
            "UPDATE images SET
                status = $2,
                moderated_by = $3,
                moderated_at = $4,
                moderation_notes = $5,
                flagged_at = $6,
                flag_reason = $7,
                deleted_at = $8,
                deleted_by = $9,
                deletion_reason = $10,
                status_before_delete = $11
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(id)
            .bind(state.status.as_str())
            .bind(state.moderated_by)
            .bind(state.moderated_at)
            .bind(&state.moderation_notes)
            .bind(state.flagged_at)
            .bind(&state.flag_reason)
            .bind(state.deleted_at)
            .bind(state.deleted_by)
            .bind(&state.deletion_reason)
            .bind(state.status_before_delete.map(|s| s.as_str()))
            .fetch_optional(pool)
            .await
    }

    /// Apply duplicate marks in one transaction. Images not listed keep
    /// their current flags. Returns the number of rows that changed.
    pub async fn apply_duplicate_marks(
        pool: &PgPool,
        marks: &[DuplicateMark],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut changed = 0;
        for mark in marks {
            let result = sqlx::query(
                "UPDATE images SET is_duplicate = true, duplicate_of = $2
                 WHERE id = $1 AND (is_duplicate = false OR duplicate_of IS DISTINCT FROM $2)",
            )
            .bind(mark.image_id)
            .bind(mark.master_id)
            .execute(&mut *tx)
            .await?;
            changed += result.rows_affected();
        }
        tx.commit().await?;
        Ok(changed)
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn stats(pool: &PgPool) -> Result<ImageStats, sqlx::Error> {
        sqlx::query_as::<_, ImageStats>(
            "SELECT
                COUNT(*) AS total_images,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending_images,
                COUNT(*) FILTER (WHERE status = 'approved') AS approved_images,
                COUNT(*) FILTER (WHERE status = 'rejected') AS rejected_images,
                COUNT(*) FILTER (WHERE status = 'flagged') AS flagged_images,
                COUNT(*) FILTER (WHERE status = 'deleted') AS deleted_images,
                COUNT(*) FILTER (WHERE is_duplicate) AS duplicate_images,
                COALESCE(SUM(file_size), 0)::BIGINT AS total_file_size,
                COALESCE(AVG(file_size), 0)::BIGINT AS average_file_size
             FROM images",
        )
        .fetch_one(pool)
        .await
    }
}
