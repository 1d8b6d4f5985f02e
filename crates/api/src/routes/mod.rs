pub mod accounts;
pub mod admin;
pub mod content;
pub mod health;
pub mod pages;
pub mod premium;
pub mod properties;

use axum::Router;
use estate_core::access::AdminAccessConfig;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/...               register, login, refresh, logout
/// /account/...            profile, password, activity, notifications
/// /properties/...         search, CRUD, images
/// /images/{id}            owner delete
/// /saved-searches/...     saved filters
/// /premium/...            plans, checkout, listings, dashboard
/// /contact                inquiries
/// /blog/...               published posts
/// /legal/{slug}           legal pages
/// /analytics/...          page views, shares
/// /admin/...              admin panel (IP allow-list + admin role)
/// ```
pub fn api_routes(admin_access: AdminAccessConfig) -> Router<AppState> {
    Router::new()
        .nest("/auth", accounts::auth_router())
        .nest("/account", accounts::account_router())
        .nest("/properties", properties::router())
        .nest("/images", properties::image_router())
        .nest("/saved-searches", properties::saved_search_router())
        .nest("/premium", premium::router())
        .nest("/contact", content::contact_router())
        .nest("/blog", content::blog_router())
        .nest("/legal", content::legal_router())
        .nest("/analytics", content::analytics_router())
        .nest("/admin", admin::router(admin_access))
}
