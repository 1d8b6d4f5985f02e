//! Aggregate counts for the admin dashboard.

use estate_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::dashboard::SiteStats;

pub struct DashboardRepo;

impl DashboardRepo {
    /// Site-wide counters; "recent" means created at or after `since`.
    pub async fn site_stats(pool: &PgPool, since: Timestamp) -> Result<SiteStats, sqlx::Error> {
        sqlx::query_as::<_, SiteStats>(
            "SELECT
                (SELECT COUNT(*) FROM properties) AS total_properties,
                (SELECT COUNT(*) FROM properties WHERE is_verified) AS verified_properties,
                (SELECT COUNT(*) FROM properties WHERE NOT is_verified) AS pending_verifications,
                (SELECT COUNT(*) FROM properties WHERE created_at >= $1) AS recent_properties,
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM users WHERE user_type = 'broker') AS total_brokers,
                (SELECT COUNT(*) FROM users WHERE user_type = 'buyer') AS total_buyers,
                (SELECT COUNT(*) FROM contact_inquiries) AS total_inquiries,
                (SELECT COUNT(*) FROM contact_inquiries WHERE NOT is_resolved) AS unresolved_inquiries,
                (SELECT COUNT(*) FROM blog_posts) AS total_blog_posts,
                (SELECT COUNT(*) FROM blog_posts WHERE is_published) AS published_posts,
                (SELECT COUNT(*) FROM page_views) AS total_page_views,
                (SELECT COUNT(*) FROM page_views WHERE created_at >= $1) AS recent_page_views",
        )
        .bind(since)
        .fetch_one(pool)
        .await
    }
}
