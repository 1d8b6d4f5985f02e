//! Email notification log.

use estate_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const NOTIFY_PREMIUM_ACTIVATED: &str = "premium_activated";
pub const NOTIFY_PREMIUM_EXPIRING: &str = "premium_expiring";
pub const NOTIFY_PREMIUM_EXPIRED: &str = "premium_expired";
pub const NOTIFY_PAYMENT_FAILED: &str = "payment_failed";
pub const NOTIFY_IMAGE_MODERATED: &str = "image_moderated";

/// A row from the `email_notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmailNotification {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub notification_type: String,
    pub subject: String,
    pub message: String,
    pub recipient: String,
    pub is_sent: bool,
    pub sent_at: Option<Timestamp>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for logging one delivery attempt.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmailNotification {
    pub user_id: Option<DbId>,
    pub notification_type: String,
    pub subject: String,
    pub message: String,
    pub recipient: String,
    pub is_sent: bool,
    pub sent_at: Option<Timestamp>,
    pub error_message: Option<String>,
}
