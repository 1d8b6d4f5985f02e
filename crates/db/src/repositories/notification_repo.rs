//! Repository for the `email_notifications` log.

use estate_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::{CreateEmailNotification, EmailNotification};

const COLUMNS: &str = "id, user_id, notification_type, subject, message, recipient, is_sent, \
                        sent_at, error_message, created_at, updated_at";

pub struct EmailNotificationRepo;

impl EmailNotificationRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateEmailNotification,
    ) -> Result<EmailNotification, sqlx::Error> {
        let query = format!(
            "INSERT INTO email_notifications (user_id, notification_type, subject, message,
                                              recipient, is_sent, sent_at, error_message)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailNotification>(&query)
            .bind(input.user_id)
            .bind(&input.notification_type)
            .bind(&input.subject)
            .bind(&input.message)
            .bind(&input.recipient)
            .bind(input.is_sent)
            .bind(input.sent_at)
            .bind(&input.error_message)
            .fetch_one(pool)
            .await
    }

    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<EmailNotification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_notifications
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, EmailNotification>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<EmailNotification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_notifications ORDER BY created_at DESC LIMIT $1"
        );
        sqlx::query_as::<_, EmailNotification>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
