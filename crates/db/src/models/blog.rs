//! Blog post model and DTOs.

use estate_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `blog_posts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlogPost {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub author_id: DbId,
    pub content: String,
    pub excerpt: String,
    pub image_path: Option<String>,
    pub is_published: bool,
    pub view_count: i32,
    pub published_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlogPost {
    pub title: String,
    pub slug: String,
    pub author_id: DbId,
    pub content: String,
    pub excerpt: String,
    pub image_path: Option<String>,
    pub is_published: bool,
}

/// DTO for updating a post. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBlogPost {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub image_path: Option<String>,
    pub is_published: Option<bool>,
}
