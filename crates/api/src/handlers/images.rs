//! Handlers for property images: upload, listing and moderation.
//!
//! Moderation itself is shared by the single-image admin endpoint, the
//! owner's delete and the bulk admin actions through [`moderate_image`].

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use estate_core::error::CoreError;
use estate_core::fake_image::{assess, validate_upload, SuspicionReport};
use estate_core::moderation::{
    ImageStatus, ModerationAction, STATUS_FLAGGED, STATUS_PENDING,
};
use estate_core::types::DbId;
use estate_db::models::image::{CreateImage, Image, ImageStats, ImageWithProperty};
use estate_db::repositories::{ImageRepo, PropertyRepo, UserRepo};
use estate_events::{ListingSubject, Notifier, Recipient};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::properties::find_property;
use crate::media::{inspect_upload, remove_upload, store_upload};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the file.
const FILE_FIELD: &str = "image";

#[derive(Debug, Deserialize)]
pub struct ModerateRequest {
    /// `approve`, `reject`, `flag`, `delete` or `restore`.
    pub action: String,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueueParams {
    /// Comma-separated statuses; defaults to `pending,flagged`.
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SuspicionResponse {
    pub image_id: DbId,
    pub file_size: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub is_duplicate: bool,
    pub duplicate_of: Option<DbId>,
    #[serde(flatten)]
    pub report: SuspicionReport,
}

#[derive(Debug, Serialize)]
pub struct ImageStatsResponse {
    #[serde(flatten)]
    pub stats: ImageStats,
    pub pending_percent: f64,
    pub approved_percent: f64,
    pub rejected_percent: f64,
    pub flagged_percent: f64,
    pub deleted_percent: f64,
    pub duplicate_percent: f64,
}

impl From<ImageStats> for ImageStatsResponse {
    fn from(stats: ImageStats) -> Self {
        Self {
            pending_percent: stats.percent(stats.pending_images),
            approved_percent: stats.percent(stats.approved_images),
            rejected_percent: stats.percent(stats.rejected_images),
            flagged_percent: stats.percent(stats.flagged_images),
            deleted_percent: stats.percent(stats.deleted_images),
            duplicate_percent: stats.percent(stats.duplicate_images),
            stats,
        }
    }
}

/// Parse an admin moderation verb.
pub fn parse_moderation_action(
    action: &str,
    reason: Option<String>,
) -> Result<ModerationAction, CoreError> {
    let reason = reason.filter(|r| !r.trim().is_empty());
    match action {
        "approve" => Ok(ModerationAction::Approve),
        "reject" => Ok(ModerationAction::Reject { reason }),
        "flag" => Ok(ModerationAction::Flag { reason }),
        "delete" => Ok(ModerationAction::SoftDelete { reason }),
        "restore" => Ok(ModerationAction::Restore),
        other => Err(CoreError::Validation(format!(
            "Unknown moderation action '{other}'. Must be one of: approve, reject, flag, delete, restore"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Owner / public
// ---------------------------------------------------------------------------

/// POST /api/v1/properties/{id}/images
///
/// Multipart upload with an `image` file field and optional `caption`.
/// A file whose bytes match an existing image is stored but marked as its
/// duplicate straight away.
pub async fn upload(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(property_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Image>>)> {
    let property = find_property(&state, property_id).await?;
    auth_user.ensure_owner(property.owner_id)?;

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut caption: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some(FILE_FIELD) => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((filename, data.to_vec()));
            }
            Some("caption") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                caption = Some(text).filter(|c| !c.trim().is_empty());
            }
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or_else(|| {
        AppError::BadRequest(format!("Missing '{FILE_FIELD}' file field"))
    })?;
    let extension = validate_upload(&filename, bytes.len())?;

    let facts = inspect_upload(&bytes);
    let master = ImageRepo::find_master_by_hash(&state.pool, &facts.content_hash).await?;

    let file_path = store_upload(&state.config.media_root, &extension, &bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

    let input = CreateImage {
        property_id,
        file_path: file_path.clone(),
        caption,
        content_hash: Some(facts.content_hash),
        is_duplicate: master.is_some(),
        duplicate_of: master.as_ref().map(|m| m.id),
        file_size: Some(facts.file_size),
        width: facts.width,
        height: facts.height,
    };

    let image = match ImageRepo::create(&state.pool, &input).await {
        Ok(image) => image,
        Err(e) => {
            if let Err(io) = remove_upload(&state.config.media_root, &file_path).await {
                tracing::warn!(path = %file_path, error = %io, "Failed to remove orphaned upload");
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        image_id = image.id,
        property_id,
        duplicate_of = ?image.duplicate_of,
        size = image.file_size,
        "Image uploaded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: image })))
}

/// GET /api/v1/properties/{id}/images
///
/// Owners and admins see every non-deleted image; everyone else sees
/// pending and approved ones.
pub async fn list_for_property(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(property_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Image>>>> {
    let property = find_property(&state, property_id).await?;
    let images = ImageRepo::list_for_property(&state.pool, property_id, false).await?;

    let privileged = viewer
        .0
        .as_ref()
        .is_some_and(|u| u.ensure_owner(property.owner_id).is_ok());
    let images = if privileged {
        images
    } else {
        public_images(images)
    };
    Ok(Json(DataResponse { data: images }))
}

pub(crate) fn public_images(images: Vec<Image>) -> Vec<Image> {
    images
        .into_iter()
        .filter(|img| matches!(img.image_status(), Ok(ImageStatus::Pending | ImageStatus::Approved)))
        .collect()
}

/// DELETE /api/v1/images/{id}
///
/// Owner removal: a soft delete that stays restorable by admins.
pub async fn delete_own(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let image = find_image(&state, id).await?;
    let property = find_property(&state, image.property_id).await?;
    auth_user.ensure_owner(property.owner_id)?;

    let action = ModerationAction::SoftDelete {
        reason: Some("Removed by owner".into()),
    };
    moderate_image(&state, id, &action, Some(auth_user.user_id), false).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/images
pub async fn review_queue(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<QueueParams>,
) -> AppResult<Json<DataResponse<Vec<ImageWithProperty>>>> {
    let statuses: Vec<String> = match params.status.as_deref() {
        Some(raw) if !raw.trim().is_empty() => raw
            .split(',')
            .map(|s| s.trim().parse::<ImageStatus>().map(|st| st.as_str().to_string()))
            .collect::<Result<_, _>>()?,
        _ => vec![STATUS_PENDING.to_string(), STATUS_FLAGGED.to_string()],
    };
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();

    let images = ImageRepo::list_by_status(&state.pool, &statuses, limit, offset).await?;
    Ok(Json(DataResponse { data: images }))
}

/// GET /api/v1/admin/images/stats
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<ImageStatsResponse>>> {
    let stats = ImageRepo::stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats.into() }))
}

/// GET /api/v1/admin/images/{id}/suspicion
pub async fn suspicion_report(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SuspicionResponse>>> {
    let image = find_image(&state, id).await?;
    let report = assess(&image.signals()?);
    Ok(Json(DataResponse {
        data: SuspicionResponse {
            image_id: image.id,
            file_size: image.file_size,
            width: image.width,
            height: image.height,
            is_duplicate: image.is_duplicate,
            duplicate_of: image.duplicate_of,
            report,
        },
    }))
}

/// POST /api/v1/admin/images/{id}/moderate
pub async fn moderate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ModerateRequest>,
) -> AppResult<Json<DataResponse<Image>>> {
    let action = parse_moderation_action(&input.action, input.reason)?;
    let image = moderate_image(&state, id, &action, Some(admin.user_id), true).await?;
    Ok(Json(DataResponse { data: image }))
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

pub(crate) async fn find_image(state: &AppState, id: DbId) -> AppResult<Image> {
    ImageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Image", id }))
}

/// Apply a moderation transition, persist it and, when `notify_owner` is
/// set, email the property owner.
pub(crate) async fn moderate_image(
    state: &AppState,
    id: DbId,
    action: &ModerationAction,
    actor: Option<DbId>,
    notify_owner: bool,
) -> AppResult<Image> {
    let image = find_image(state, id).await?;
    let next = image.moderation_state()?.apply(action, actor, Utc::now())?;

    let saved = ImageRepo::save_moderation(&state.pool, id, &next)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Image", id }))?;

    tracing::info!(
        image_id = id,
        actor = ?actor,
        from = %image.status,
        to = %saved.status,
        "Image {}",
        action.past_tense()
    );

    if notify_owner {
        notify_image_owner(state, &saved, action).await;
    }
    Ok(saved)
}

async fn notify_image_owner(state: &AppState, image: &Image, action: &ModerationAction) {
    let property = match PropertyRepo::find_by_id(&state.pool, image.property_id).await {
        Ok(Some(p)) => p,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(image_id = image.id, error = %e, "Failed to load property for notice");
            return;
        }
    };
    let owner = match UserRepo::find_by_id(&state.pool, property.owner_id).await {
        Ok(Some(u)) => u,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(image_id = image.id, error = %e, "Failed to load owner for notice");
            return;
        }
    };

    let reason = match action {
        ModerationAction::Reject { reason }
        | ModerationAction::Flag { reason }
        | ModerationAction::SoftDelete { reason } => reason.as_deref(),
        ModerationAction::Approve | ModerationAction::Restore => None,
    };

    let entry = state
        .notifier
        .image_moderated(
            &Recipient::new(owner.id, owner.display_name(), &owner.email),
            ListingSubject {
                property_id: property.id,
                property_title: &property.title,
            },
            image.id,
            action.past_tense(),
            reason,
        )
        .await;
    Notifier::record(&state.pool, &entry).await;
}
