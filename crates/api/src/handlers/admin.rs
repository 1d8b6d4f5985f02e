//! Admin panel handlers: dashboard, users, notification log, bulk actions
//! and the property export.
//!
//! Every route here sits behind the admin IP allow-list as well as
//! [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use estate_core::admin_actions::{
    validate_selection, AdminAction, AdminActionSpec, ADMIN_ACTIONS,
};
use estate_core::error::CoreError;
use estate_core::moderation::ModerationAction;
use estate_core::payment::bulk_payment_id;
use estate_core::premium::{PlanType, ADMIN_EXTENSION_DAYS};
use estate_core::property::validate_status;
use estate_core::roles::{validate_user_type, ROLE_BROKER, ROLE_BUYER};
use estate_core::types::DbId;
use estate_db::models::dashboard::SiteStats;
use estate_db::models::notification::EmailNotification;
use estate_db::models::user::UserResponse;
use estate_db::repositories::{
    BlogPostRepo, ContactInquiryRepo, DashboardRepo, EmailNotificationRepo, ImageRepo,
    PremiumListingRepo, PropertyRepo, UserRepo,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::images::{moderate_image, ImageStatsResponse};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Window for the "recent" dashboard counters.
const RECENT_DAYS: i64 = 30;

/// Rows shown in the notification log.
const NOTIFICATION_LOG_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    #[serde(flatten)]
    pub site: SiteStats,
    pub images: ImageStatsResponse,
}

#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub user_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    pub ids: Vec<DbId>,
    pub status: Option<String>,
}

/// An id the action could not be applied to.
#[derive(Debug, Serialize)]
pub struct SkippedItem {
    pub id: DbId,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct ActionResult {
    pub action: &'static str,
    pub affected: u64,
    pub skipped: Vec<SkippedItem>,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/stats
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<DashboardStats>>> {
    let since = Utc::now() - Duration::days(RECENT_DAYS);
    let site = DashboardRepo::site_stats(&state.pool, since).await?;
    let images = ImageRepo::stats(&state.pool).await?;
    Ok(Json(DataResponse {
        data: DashboardStats {
            site,
            images: images.into(),
        },
    }))
}

/// GET /api/v1/admin/notifications
pub async fn notifications(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<EmailNotification>>>> {
    let rows = EmailNotificationRepo::list_recent(&state.pool, NOTIFICATION_LOG_LIMIT).await?;
    Ok(Json(DataResponse { data: rows }))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let user_type = params.user_type.as_deref().filter(|t| !t.is_empty());
    if let Some(t) = user_type {
        validate_user_type(t)?;
    }
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();
    let users = UserRepo::list(&state.pool, user_type, limit, offset)
        .await?
        .iter()
        .map(UserResponse::from)
        .collect();
    Ok(Json(DataResponse { data: users }))
}

/// DELETE /api/v1/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Conflict(
            "You cannot delete your own account".into(),
        )));
    }
    if UserRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = id, admin_id = admin.user_id, "User deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}

// ---------------------------------------------------------------------------
// Bulk actions
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/actions
pub async fn list_actions(
    RequireAdmin(_admin): RequireAdmin,
) -> Json<DataResponse<&'static [AdminActionSpec]>> {
    Json(DataResponse {
        data: ADMIN_ACTIONS,
    })
}

/// POST /api/v1/admin/actions
///
/// Run one entry of the action table over a selection of ids.
pub async fn run_action(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ActionRequest>,
) -> AppResult<Json<DataResponse<ActionResult>>> {
    let action: AdminAction = input.action.parse()?;
    validate_selection(&input.ids)?;
    let status = match (action.spec().requires_status, input.status.as_deref()) {
        (true, None) | (true, Some("")) => {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Action '{action}' requires a status"
            ))));
        }
        (_, status) => status,
    };

    let ids = input.ids.as_slice();
    let pool = &state.pool;
    let mut skipped = Vec::new();

    let affected = match action {
        AdminAction::MarkVerified => PropertyRepo::set_verified_bulk(pool, ids).await?,
        AdminAction::MarkPremium => PropertyRepo::set_premium_bulk(pool, ids, true).await?,
        AdminAction::RemovePremium => PropertyRepo::set_premium_bulk(pool, ids, false).await?,
        AdminAction::BulkUpdateStatus => {
            let status = status.unwrap_or_default();
            validate_status(status)?;
            PropertyRepo::set_status_bulk(pool, ids, status).await?
        }
        AdminAction::CreateBulkPremium => {
            let now = Utc::now();
            let plan = PlanType::Basic;
            let mut created = 0;
            for &id in ids {
                let granted = PremiumListingRepo::grant_to_owner(
                    pool,
                    id,
                    plan.as_str(),
                    plan.price(),
                    &bulk_payment_id(id, now),
                    now,
                    plan.end_date_from(now),
                )
                .await?;
                match granted {
                    Some(_) => created += 1,
                    None => skipped.push(SkippedItem {
                        id,
                        reason: "Property missing or already premium".into(),
                    }),
                }
            }
            created
        }
        AdminAction::ActivatePremium => PremiumListingRepo::set_active_bulk(pool, ids, true).await?,
        AdminAction::DeactivatePremium => {
            PremiumListingRepo::set_active_bulk(pool, ids, false).await?
        }
        AdminAction::ExtendPremium => {
            PremiumListingRepo::extend_bulk(pool, ids, ADMIN_EXTENSION_DAYS).await?
        }
        AdminAction::ApproveImages => {
            moderate_each(&state, ids, ModerationAction::Approve, admin.user_id, &mut skipped)
                .await?
        }
        AdminAction::RejectImages => {
            let verb = ModerationAction::Reject { reason: None };
            moderate_each(&state, ids, verb, admin.user_id, &mut skipped).await?
        }
        AdminAction::FlagImages => {
            let verb = ModerationAction::Flag { reason: None };
            moderate_each(&state, ids, verb, admin.user_id, &mut skipped).await?
        }
        AdminAction::DeleteImages => {
            let verb = ModerationAction::SoftDelete { reason: None };
            moderate_each(&state, ids, verb, admin.user_id, &mut skipped).await?
        }
        AdminAction::RestoreImages => {
            moderate_each(&state, ids, ModerationAction::Restore, admin.user_id, &mut skipped)
                .await?
        }
        AdminAction::MarkResolved => ContactInquiryRepo::set_resolved_bulk(pool, ids, true).await?,
        AdminAction::MarkUnresolved => {
            ContactInquiryRepo::set_resolved_bulk(pool, ids, false).await?
        }
        AdminAction::PublishPosts => BlogPostRepo::set_published_bulk(pool, ids, true).await?,
        AdminAction::UnpublishPosts => BlogPostRepo::set_published_bulk(pool, ids, false).await?,
        AdminAction::ResetViewCounts => BlogPostRepo::reset_view_counts(pool, ids).await?,
        AdminAction::ActivateUsers => UserRepo::set_active_bulk(pool, ids, true).await?,
        AdminAction::DeactivateUsers => UserRepo::set_active_bulk(pool, ids, false).await?,
        AdminAction::MakeBrokers => UserRepo::set_user_type_bulk(pool, ids, ROLE_BROKER).await?,
        AdminAction::MakeBuyers => UserRepo::set_user_type_bulk(pool, ids, ROLE_BUYER).await?,
    };

    tracing::info!(
        action = action.name(),
        admin_id = admin.user_id,
        selected = ids.len(),
        affected,
        skipped = skipped.len(),
        "Admin action applied"
    );

    Ok(Json(DataResponse {
        data: ActionResult {
            action: action.name(),
            affected,
            message: format!("{} {} item(s) updated", action.spec().description, affected),
            skipped,
        },
    }))
}

/// Apply one moderation verb to each image. Transitions the state machine
/// refuses, and ids that no longer exist, are reported rather than aborting
/// the batch.
async fn moderate_each(
    state: &AppState,
    ids: &[DbId],
    action: ModerationAction,
    admin_id: DbId,
    skipped: &mut Vec<SkippedItem>,
) -> AppResult<u64> {
    let mut done = 0;
    for &id in ids {
        match moderate_image(state, id, &action, Some(admin_id), false).await {
            Ok(_) => done += 1,
            Err(AppError::Core(
                e @ (CoreError::Conflict(_) | CoreError::NotFound { .. } | CoreError::Validation(_)),
            )) => skipped.push(SkippedItem {
                id,
                reason: e.to_string(),
            }),
            Err(e) => return Err(e),
        }
    }
    Ok(done)
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/properties/export
///
/// All properties as CSV.
pub async fn export_properties(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<impl IntoResponse> {
    let rows = PropertyRepo::export_rows(&state.pool).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in &rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::InternalError(format!("CSV encode failed: {e}")))?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| AppError::InternalError(format!("CSV flush failed: {e}")))?;

    tracing::info!(rows = rows.len(), "Property export generated");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"properties.csv\"",
            ),
        ],
        body,
    ))
}
