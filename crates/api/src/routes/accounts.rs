//! Route definitions for `/auth` and `/account`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::accounts;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register  -> register
/// POST /login     -> login
/// POST /refresh   -> refresh
/// POST /logout    -> logout (requires auth)
/// ```
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/refresh", post(accounts::refresh))
        .route("/logout", post(accounts::logout))
}

/// Routes mounted at `/account`. All require auth.
///
/// ```text
/// GET  /profile         -> get_profile
/// PUT  /profile         -> update_profile
/// POST /password        -> change_password
/// GET  /activity        -> list_activity
/// GET  /notifications   -> list_notifications
/// ```
pub fn account_router() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(accounts::get_profile).put(accounts::update_profile),
        )
        .route("/password", post(accounts::change_password))
        .route("/activity", get(accounts::list_activity))
        .route("/notifications", get(accounts::list_notifications))
}
