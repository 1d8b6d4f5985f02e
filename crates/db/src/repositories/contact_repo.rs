//! Repository for the `contact_inquiries` table.

use estate_core::types::DbId;
use sqlx::PgPool;

use crate::models::contact::{ContactInquiry, CreateContactInquiry, UpdateContactInquiry};

const COLUMNS: &str = "id, name, email, phone, subject, message, inquiry_type, property_id, \
                        is_resolved, admin_notes, created_at, updated_at";

pub struct ContactInquiryRepo;

impl ContactInquiryRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateContactInquiry,
    ) -> Result<ContactInquiry, sqlx::Error> {
        let query = format!(
            "INSERT INTO contact_inquiries (name, email, phone, subject, message, inquiry_type,
                                            property_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContactInquiry>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.subject)
            .bind(&input.message)
            .bind(&input.inquiry_type)
            .bind(input.property_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ContactInquiry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contact_inquiries WHERE id = $1");
        sqlx::query_as::<_, ContactInquiry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Newest first; `unresolved_only` hides resolved inquiries.
    pub async fn list(
        pool: &PgPool,
        unresolved_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ContactInquiry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contact_inquiries
             WHERE ($1 = false OR is_resolved = false)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ContactInquiry>(&query)
            .bind(unresolved_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateContactInquiry,
    ) -> Result<Option<ContactInquiry>, sqlx::Error> {
        let query = format!(
            "UPDATE contact_inquiries SET
                is_resolved = COALESCE($2, is_resolved),
                admin_notes = COALESCE($3, admin_notes)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContactInquiry>(&query)
            .bind(id)
            .bind(input.is_resolved)
            .bind(&input.admin_notes)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_resolved_bulk(
        pool: &PgPool,
        ids: &[DbId],
        resolved: bool,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE contact_inquiries SET is_resolved = $2
             WHERE id = ANY($1) AND is_resolved <> $2",
        )
        .bind(ids)
        .bind(resolved)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
