//! Repositories for page views, social shares and user activity.

use estate_core::types::DbId;
use sqlx::PgPool;

use crate::models::analytics::{
    CreatePageView, CreateSocialShare, CreateUserActivity, PageView, SocialShare, UserActivity,
};

// ---------------------------------------------------------------------------
// Page views
// ---------------------------------------------------------------------------

const PAGE_VIEW_COLUMNS: &str = "id, property_id, user_id, url, ip_address, user_agent, referrer, \
                                  time_spent, created_at, updated_at";

pub struct PageViewRepo;

impl PageViewRepo {
    pub async fn create(pool: &PgPool, input: &CreatePageView) -> Result<PageView, sqlx::Error> {
        let query = format!(
            "INSERT INTO page_views (property_id, user_id, url, ip_address, user_agent, referrer)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {PAGE_VIEW_COLUMNS}"
        );
        sqlx::query_as::<_, PageView>(&query)
            .bind(input.property_id)
            .bind(input.user_id)
            .bind(&input.url)
            .bind(&input.ip_address)
            .bind(&input.user_agent)
            .bind(&input.referrer)
            .fetch_one(pool)
            .await
    }

    pub async fn count_for_property(pool: &PgPool, property_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM page_views WHERE property_id = $1")
            .bind(property_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}

// ---------------------------------------------------------------------------
// Social shares
// ---------------------------------------------------------------------------

const SHARE_COLUMNS: &str = "id, user_id, property_id, blog_post_id, platform, content_type, \
                              url_shared, page_title, ip_address, user_agent, referrer, success, \
                              metadata, created_at, updated_at";

pub struct SocialShareRepo;

impl SocialShareRepo {
    pub async fn create(pool: &PgPool, input: &CreateSocialShare) -> Result<SocialShare, sqlx::Error> {
        let query = format!(
            "INSERT INTO social_shares (user_id, property_id, blog_post_id, platform, content_type,
                                        url_shared, page_title, ip_address, user_agent, referrer,
                                        metadata)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {SHARE_COLUMNS}"
        );
        sqlx::query_as::<_, SocialShare>(&query)
            .bind(input.user_id)
            .bind(input.property_id)
            .bind(input.blog_post_id)
            .bind(&input.platform)
            .bind(&input.content_type)
            .bind(&input.url_shared)
            .bind(&input.page_title)
            .bind(&input.ip_address)
            .bind(&input.user_agent)
            .bind(&input.referrer)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    /// `(platform, count)` for shares, optionally limited to one property or
    /// one blog post.
    pub async fn counts_by_platform(
        pool: &PgPool,
        property_id: Option<DbId>,
        blog_post_id: Option<DbId>,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT platform, COUNT(*) FROM social_shares
             WHERE ($1::BIGINT IS NULL OR property_id = $1)
               AND ($2::BIGINT IS NULL OR blog_post_id = $2)
             GROUP BY platform
             ORDER BY platform",
        )
        .bind(property_id)
        .bind(blog_post_id)
        .fetch_all(pool)
        .await
    }
}

// ---------------------------------------------------------------------------
// User activity
// ---------------------------------------------------------------------------

const ACTIVITY_COLUMNS: &str =
    "id, user_id, activity_type, description, ip_address, metadata, created_at, updated_at";

pub struct UserActivityRepo;

impl UserActivityRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateUserActivity,
    ) -> Result<UserActivity, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_activities (user_id, activity_type, description, ip_address, metadata)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ACTIVITY_COLUMNS}"
        );
        sqlx::query_as::<_, UserActivity>(&query)
            .bind(input.user_id)
            .bind(&input.activity_type)
            .bind(&input.description)
            .bind(&input.ip_address)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<UserActivity>, sqlx::Error> {
        let query = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM user_activities
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, UserActivity>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
