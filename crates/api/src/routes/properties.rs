//! Route definitions for properties, their images and saved searches.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get};
use axum::Router;
use estate_core::fake_image::MAX_UPLOAD_BYTES;

use crate::handlers::{images, properties};
use crate::state::AppState;

/// Multipart framing on top of the file itself.
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

/// Routes mounted at `/properties`.
///
/// ```text
/// GET    /                 -> search
/// POST   /                 -> create (broker or admin)
/// GET    /home             -> home_feed
/// GET    /mine             -> list_mine
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update (owner)
/// DELETE /{id}             -> delete (owner)
/// GET    /{id}/images      -> images::list_for_property
/// POST   /{id}/images      -> images::upload (owner, multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(properties::search).post(properties::create))
        .route("/home", get(properties::home_feed))
        .route("/mine", get(properties::list_mine))
        .route(
            "/{id}",
            get(properties::get_by_id)
                .put(properties::update)
                .delete(properties::delete),
        )
        .route(
            "/{id}/images",
            get(images::list_for_property).post(images::upload).layer(
                DefaultBodyLimit::max(MAX_UPLOAD_BYTES + UPLOAD_OVERHEAD_BYTES),
            ),
        )
}

/// Routes mounted at `/images`.
///
/// ```text
/// DELETE /{id}   -> delete_own (owner soft delete)
/// ```
pub fn image_router() -> Router<AppState> {
    Router::new().route("/{id}", delete(images::delete_own))
}

/// Routes mounted at `/saved-searches`. All require auth.
///
/// ```text
/// GET    /       -> list_saved_searches
/// POST   /       -> create_saved_search
/// DELETE /{id}   -> delete_saved_search
/// ```
pub fn saved_search_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(properties::list_saved_searches).post(properties::create_saved_search),
        )
        .route("/{id}", delete(properties::delete_saved_search))
}
