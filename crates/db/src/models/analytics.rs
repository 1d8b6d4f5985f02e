//! Page views, social shares and user activity.

use estate_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PageView {
    pub id: DbId,
    pub property_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub url: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub referrer: Option<String>,
    pub time_spent: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePageView {
    pub property_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub url: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub referrer: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SocialShare {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub property_id: Option<DbId>,
    pub blog_post_id: Option<DbId>,
    pub platform: String,
    pub content_type: String,
    pub url_shared: String,
    pub page_title: String,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub referrer: String,
    pub success: bool,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSocialShare {
    pub user_id: Option<DbId>,
    pub property_id: Option<DbId>,
    pub blog_post_id: Option<DbId>,
    pub platform: String,
    pub content_type: String,
    pub url_shared: String,
    pub page_title: String,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub referrer: String,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserActivity {
    pub id: DbId,
    pub user_id: DbId,
    pub activity_type: String,
    pub description: String,
    pub ip_address: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserActivity {
    pub user_id: DbId,
    pub activity_type: String,
    pub description: String,
    pub ip_address: Option<String>,
    pub metadata: serde_json::Value,
}
