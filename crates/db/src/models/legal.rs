//! Legal page model.

use estate_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LegalPage {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating or replacing the page at `slug`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertLegalPage {
    pub slug: String,
    pub title: String,
    pub content: String,
}
