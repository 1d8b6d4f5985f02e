//! Saved property searches.

use estate_core::search::PropertyFilter;
use estate_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SavedSearch {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub filters: Json<PropertyFilter>,
    pub alert: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateSavedSearch {
    pub name: String,
    pub filters: PropertyFilter,
    #[serde(default)]
    pub alert: bool,
}
