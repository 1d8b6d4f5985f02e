//! Handlers for page-view and social-share tracking.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use estate_core::analytics::{
    clip_page_title, resolve_share_content_type, validate_share_platform, ShareStats,
    ACTIVITY_PROPERTY_VIEW,
};
use estate_core::contact::require_text;
use estate_core::types::DbId;
use estate_db::models::analytics::{CreatePageView, CreateSocialShare};
use estate_db::repositories::{PageViewRepo, SocialShareRepo};
use serde::Deserialize;
use serde_json::json;

use crate::activity::{record_activity, ClientMeta};
use crate::error::AppResult;
use crate::handlers::properties::find_property;
use crate::middleware::auth::MaybeAuthUser;
use crate::response::{DataResponse, StatusMessage};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageViewRequest {
    pub property_id: Option<DbId>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub platform: String,
    pub content_type: Option<String>,
    pub property_id: Option<DbId>,
    pub blog_post_id: Option<DbId>,
    pub url_shared: String,
    #[serde(default)]
    pub page_title: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct ShareStatsParams {
    pub property_id: Option<DbId>,
    pub blog_post_id: Option<DbId>,
}

/// POST /api/v1/analytics/page-views
pub async fn track_page_view(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    meta: ClientMeta,
    Json(input): Json<PageViewRequest>,
) -> AppResult<(StatusCode, Json<StatusMessage>)> {
    let property = match input.property_id {
        Some(id) => Some(find_property(&state, id).await?),
        None => None,
    };

    record_page_view(&state, viewer.user_id(), property.as_ref().map(|p| p.id), input.url, &meta)
        .await?;

    if let (Some(user_id), Some(property)) = (viewer.user_id(), &property) {
        record_activity(
            &state.pool,
            user_id,
            ACTIVITY_PROPERTY_VIEW,
            format!("Viewed property: {}", property.title),
            &meta,
            json!({ "property_id": property.id }),
        )
        .await;
    }

    Ok((StatusCode::CREATED, Json(StatusMessage::ok("Page view recorded"))))
}

/// POST /api/v1/analytics/shares
pub async fn track_share(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    meta: ClientMeta,
    Json(input): Json<ShareRequest>,
) -> AppResult<(StatusCode, Json<StatusMessage>)> {
    let platform = input.platform.trim().to_lowercase();
    validate_share_platform(&platform)?;
    let content_type = resolve_share_content_type(input.content_type.as_deref())?.to_string();
    require_text("url_shared", &input.url_shared)?;

    let metadata = if input.metadata.is_null() {
        json!({})
    } else {
        input.metadata
    };

    let share = SocialShareRepo::create(
        &state.pool,
        &CreateSocialShare {
            user_id: viewer.user_id(),
            property_id: input.property_id,
            blog_post_id: input.blog_post_id,
            platform,
            content_type,
            url_shared: input.url_shared,
            page_title: clip_page_title(&input.page_title),
            ip_address: meta.ip_address.clone(),
            user_agent: meta.user_agent.clone(),
            referrer: meta.referrer.clone().unwrap_or_default(),
            metadata,
        },
    )
    .await?;

    tracing::debug!(share_id = share.id, platform = %share.platform, "Share tracked");
    Ok((StatusCode::CREATED, Json(StatusMessage::ok("Share tracked"))))
}

/// GET /api/v1/analytics/shares/stats
pub async fn share_stats(
    State(state): State<AppState>,
    Query(params): Query<ShareStatsParams>,
) -> AppResult<Json<DataResponse<ShareStats>>> {
    let rows =
        SocialShareRepo::counts_by_platform(&state.pool, params.property_id, params.blog_post_id)
            .await?;
    Ok(Json(DataResponse {
        data: ShareStats::from_counts(&rows),
    }))
}

/// Store one page view for the current request.
pub(crate) async fn record_page_view(
    state: &AppState,
    user_id: Option<DbId>,
    property_id: Option<DbId>,
    url: Option<String>,
    meta: &ClientMeta,
) -> AppResult<()> {
    PageViewRepo::create(
        &state.pool,
        &CreatePageView {
            property_id,
            user_id,
            url,
            ip_address: meta.ip_address.clone(),
            user_agent: meta.user_agent.clone(),
            referrer: meta.referrer.clone(),
        },
    )
    .await?;
    Ok(())
}
