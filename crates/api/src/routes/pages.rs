//! HTML page routes, mounted at the root.

use axum::routing::get;
use axum::Router;

use crate::handlers::pages;
use crate::state::AppState;

/// ```text
/// GET /                    -> home
/// GET /properties          -> property_list
/// GET /properties/{id}     -> property_detail
/// GET /blog                -> blog_list
/// GET /blog/{key}          -> blog_post (id or slug)
/// GET /legal/{slug}        -> legal
/// GET /premium/plans       -> plans
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/properties", get(pages::property_list))
        .route("/properties/{id}", get(pages::property_detail))
        .route("/blog", get(pages::blog_list))
        .route("/blog/{key}", get(pages::blog_post))
        .route("/legal/{slug}", get(pages::legal))
        .route("/premium/plans", get(pages::plans))
}
