//! Route definitions for public content: contact, blog, legal pages and
//! analytics tracking.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{analytics, blog, contact, legal};
use crate::state::AppState;

/// Routes mounted at `/contact`.
///
/// ```text
/// POST /   -> submit
/// ```
pub fn contact_router() -> Router<AppState> {
    Router::new().route("/", post(contact::submit))
}

/// Routes mounted at `/blog`.
///
/// ```text
/// GET /              -> list_published
/// GET /{id}          -> get_by_id
/// GET /slug/{slug}   -> get_by_slug
/// ```
pub fn blog_router() -> Router<AppState> {
    Router::new()
        .route("/", get(blog::list_published))
        .route("/{id}", get(blog::get_by_id))
        .route("/slug/{slug}", get(blog::get_by_slug))
}

/// Routes mounted at `/legal`.
///
/// ```text
/// GET /{slug}   -> get_by_slug
/// ```
pub fn legal_router() -> Router<AppState> {
    Router::new().route("/{slug}", get(legal::get_by_slug))
}

/// Routes mounted at `/analytics`.
///
/// ```text
/// POST /page-views      -> track_page_view
/// POST /shares          -> track_share
/// GET  /shares/stats    -> share_stats
/// ```
pub fn analytics_router() -> Router<AppState> {
    Router::new()
        .route("/page-views", post(analytics::track_page_view))
        .route("/shares", post(analytics::track_share))
        .route("/shares/stats", get(analytics::share_stats))
}
