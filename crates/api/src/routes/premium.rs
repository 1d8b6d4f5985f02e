//! Route definitions for `/premium`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::premium;
use crate::state::AppState;

/// Routes mounted at `/premium`.
///
/// ```text
/// GET    /plans            -> plans (public)
/// POST   /promo/preview    -> preview_promo
/// POST   /checkout         -> checkout
/// GET    /listings         -> list_mine
/// GET    /listings/{id}    -> get_listing (owner)
/// DELETE /listings/{id}    -> delete_listing (owner)
/// GET    /dashboard        -> dashboard
/// GET    /analytics        -> analytics
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(premium::plans))
        .route("/promo/preview", post(premium::preview_promo))
        .route("/checkout", post(premium::checkout))
        .route("/listings", get(premium::list_mine))
        .route(
            "/listings/{id}",
            get(premium::get_listing).delete(premium::delete_listing),
        )
        .route("/dashboard", get(premium::dashboard))
        .route("/analytics", get(premium::analytics))
}
