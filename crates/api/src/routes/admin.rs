//! Route definitions for `/admin`.

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use axum::Router;
use estate_core::access::AdminAccessConfig;

use crate::handlers::{admin, blog, contact, images, legal, premium};
use crate::middleware::admin_ip::restrict_admin_ip;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// Handlers require the admin role; the whole tree is additionally wrapped
/// in the IP allow-list.
///
/// ```text
/// GET    /stats                        -> stats
/// GET    /notifications                -> notifications
/// GET    /users                        -> list_users
/// DELETE /users/{id}                   -> delete_user
/// GET    /actions                      -> list_actions
/// POST   /actions                      -> run_action
/// GET    /properties/export            -> export_properties (CSV)
///
/// GET    /images                       -> review_queue
/// GET    /images/stats                 -> stats
/// GET    /images/{id}/suspicion        -> suspicion_report
/// POST   /images/{id}/moderate         -> moderate
///
/// GET    /premium/listings             -> list
/// POST   /premium/listings             -> create
/// PUT    /premium/listings/{id}        -> update
/// GET    /premium/summary              -> summary
/// GET    /promo-codes                  -> list
/// POST   /promo-codes                  -> create
/// PUT    /promo-codes/{id}             -> update
///
/// GET    /inquiries                    -> list
/// PUT    /inquiries/{id}               -> update
///
/// GET    /blog                         -> list
/// POST   /blog                         -> create
/// PUT    /blog/{id}                    -> update
/// DELETE /blog/{id}                    -> delete
///
/// GET    /legal                        -> list
/// PUT    /legal                        -> upsert
/// ```
pub fn router(access: AdminAccessConfig) -> Router<AppState> {
    Router::new()
        .route("/stats", get(admin::stats))
        .route("/notifications", get(admin::notifications))
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/actions", get(admin::list_actions).post(admin::run_action))
        .route("/properties/export", get(admin::export_properties))
        // Images
        .route("/images", get(images::review_queue))
        .route("/images/stats", get(images::stats))
        .route("/images/{id}/suspicion", get(images::suspicion_report))
        .route("/images/{id}/moderate", post(images::moderate))
        // Premium
        .route(
            "/premium/listings",
            get(premium::admin_list).post(premium::admin_create),
        )
        .route("/premium/listings/{id}", put(premium::admin_update))
        .route("/premium/summary", get(premium::admin_summary))
        .route(
            "/promo-codes",
            get(premium::list_promo_codes).post(premium::create_promo_code),
        )
        .route("/promo-codes/{id}", put(premium::update_promo_code))
        // Inquiries
        .route("/inquiries", get(contact::admin_list))
        .route("/inquiries/{id}", put(contact::admin_update))
        // Blog
        .route("/blog", get(blog::admin_list).post(blog::admin_create))
        .route(
            "/blog/{id}",
            put(blog::admin_update).delete(blog::admin_delete),
        )
        // Legal
        .route("/legal", get(legal::admin_list).put(legal::admin_upsert))
        .layer(from_fn_with_state(Arc::new(access), restrict_admin_ip))
}
