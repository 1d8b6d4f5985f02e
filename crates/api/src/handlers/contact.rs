//! Handlers for contact inquiries.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use estate_core::analytics::ACTIVITY_CONTACT;
use estate_core::contact::{require_text, resolve_inquiry_type};
use estate_core::error::CoreError;
use estate_core::types::DbId;
use estate_db::models::contact::{ContactInquiry, CreateContactInquiry, UpdateContactInquiry};
use estate_db::repositories::ContactInquiryRepo;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::activity::{record_activity, ClientMeta};
use crate::error::{AppError, AppResult};
use crate::handlers::properties::find_property;
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required (max 255 characters)"))]
    pub name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 255))]
    pub subject: Option<String>,
    pub message: String,
    pub inquiry_type: Option<String>,
    pub property_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct InquiryListParams {
    #[serde(default)]
    pub unresolved_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/contact
pub async fn submit(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    meta: ClientMeta,
    Json(input): Json<ContactRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ContactInquiry>>)> {
    input.validate()?;
    require_text("Message", &input.message)?;
    let inquiry_type =
        resolve_inquiry_type(input.inquiry_type.as_deref(), input.property_id.is_some())?
            .to_string();

    if let Some(property_id) = input.property_id {
        find_property(&state, property_id).await?;
    }

    let inquiry = ContactInquiryRepo::create(
        &state.pool,
        &CreateContactInquiry {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            phone: input.phone.filter(|p| !p.trim().is_empty()),
            subject: input.subject.filter(|s| !s.trim().is_empty()),
            message: input.message,
            inquiry_type,
            property_id: input.property_id,
        },
    )
    .await?;

    tracing::info!(
        inquiry_id = inquiry.id,
        inquiry_type = %inquiry.inquiry_type,
        property_id = ?inquiry.property_id,
        "Contact inquiry received"
    );

    if let Some(user_id) = viewer.user_id() {
        record_activity(
            &state.pool,
            user_id,
            ACTIVITY_CONTACT,
            format!("Sent a {} inquiry", inquiry.inquiry_type),
            &meta,
            json!({ "inquiry_id": inquiry.id, "property_id": inquiry.property_id }),
        )
        .await;
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: inquiry })))
}

/// GET /api/v1/admin/inquiries
pub async fn admin_list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<InquiryListParams>,
) -> AppResult<Json<DataResponse<Vec<ContactInquiry>>>> {
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();
    let rows = ContactInquiryRepo::list(&state.pool, params.unresolved_only, limit, offset).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// PUT /api/v1/admin/inquiries/{id}
pub async fn admin_update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateContactInquiry>,
) -> AppResult<Json<DataResponse<ContactInquiry>>> {
    let inquiry = ContactInquiryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ContactInquiry",
            id,
        }))?;
    Ok(Json(DataResponse { data: inquiry }))
}
