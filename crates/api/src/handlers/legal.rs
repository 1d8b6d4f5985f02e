//! Handlers for legal pages (privacy policy, terms of service, ...).

use axum::extract::{Path, State};
use axum::Json;
use estate_core::contact::require_text;
use estate_core::error::CoreError;
use estate_core::naming::is_valid_slug;
use estate_db::models::legal::{LegalPage, UpsertLegalPage};
use estate_db::repositories::LegalPageRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/legal/{slug}
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<LegalPage>>> {
    let page = find_page(&state, &slug).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/admin/legal
pub async fn admin_list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<LegalPage>>>> {
    let pages = LegalPageRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: pages }))
}

/// PUT /api/v1/admin/legal
///
/// Create the page at `slug` or replace its title and content.
pub async fn admin_upsert(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<UpsertLegalPage>,
) -> AppResult<Json<DataResponse<LegalPage>>> {
    if !is_valid_slug(&input.slug) {
        return Err(AppError::Core(CoreError::Validation(
            "Slug may only contain lowercase letters, digits and dashes".into(),
        )));
    }
    require_text("Title", &input.title)?;
    require_text("Content", &input.content)?;

    let page = LegalPageRepo::upsert(&state.pool, &input).await?;
    tracing::info!(slug = %page.slug, admin_id = admin.user_id, "Legal page saved");
    Ok(Json(DataResponse { data: page }))
}

pub(crate) async fn find_page(state: &AppState, slug: &str) -> AppResult<LegalPage> {
    LegalPageRepo::find_by_slug(&state.pool, slug)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "LegalPage",
                key: slug.to_string(),
            })
        })
}
