//! Admin dashboard counters.

use serde::Serialize;
use sqlx::FromRow;

/// Site-wide counts shown on the admin dashboard. Image counters are
/// reported separately by [`crate::models::image::ImageStats`].
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct SiteStats {
    pub total_properties: i64,
    pub verified_properties: i64,
    pub pending_verifications: i64,
    pub recent_properties: i64,
    pub total_users: i64,
    pub total_brokers: i64,
    pub total_buyers: i64,
    pub total_inquiries: i64,
    pub unresolved_inquiries: i64,
    pub total_blog_posts: i64,
    pub published_posts: i64,
    pub total_page_views: i64,
    pub recent_page_views: i64,
}
