//! Contact inquiry model and DTOs.

use estate_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `contact_inquiries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContactInquiry {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub inquiry_type: String,
    pub property_id: Option<DbId>,
    pub is_resolved: bool,
    pub admin_notes: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContactInquiry {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub inquiry_type: String,
    pub property_id: Option<DbId>,
}

/// Admin patch of an inquiry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContactInquiry {
    pub is_resolved: Option<bool>,
    pub admin_notes: Option<String>,
}
