//! Handlers for the `/properties` resource and saved searches.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, Utc};
use estate_core::analytics::{
    ACTIVITY_PROPERTY_CREATE, ACTIVITY_PROPERTY_DELETE, ACTIVITY_PROPERTY_UPDATE, ACTIVITY_SEARCH,
};
use estate_core::error::CoreError;
use estate_core::property::{
    validate_numbers, validate_status, DEFAULT_COUNTRY, HOME_FEATURED_COUNT, HOME_LATEST_COUNT,
    STATUS_FOR_SALE,
};
use estate_core::search::PropertyFilter;
use estate_core::types::{DbId, Money};
use estate_db::models::property::{CreateProperty, Property, UpdateProperty};
use estate_db::models::saved_search::{CreateSavedSearch, SavedSearch};
use estate_db::repositories::{PropertyRepo, SavedSearchRepo};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::activity::{record_activity, ClientMeta};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::middleware::rbac::RequireBroker;
use crate::query::PaginationParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePropertyRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required (max 200 characters)"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, max = 50, message = "Property type is required"))]
    pub property_type: String,
    #[validate(length(min = 1, max = 255, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, max = 100, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 1, max = 20, message = "Zip code is required"))]
    pub zip_code: String,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    pub price: Money,
    pub square_footage: Option<i32>,
    pub lot_size: Option<Decimal>,
    pub year_built: Option<i32>,
    #[validate(length(max = 50))]
    pub zoning: Option<String>,
    pub status: Option<String>,
    pub cap_rate: Option<Decimal>,
    pub noi: Option<Money>,
    #[validate(length(max = 100))]
    pub broker_name: Option<String>,
    #[validate(length(max = 20))]
    pub broker_phone: Option<String>,
    #[validate(email(message = "Enter a valid broker email"))]
    pub broker_email: Option<String>,
    #[validate(url(message = "Virtual tour must be a valid URL"))]
    pub virtual_tour_url: Option<String>,
}

impl CreatePropertyRequest {
    fn into_create(self, owner_id: DbId) -> CreateProperty {
        CreateProperty {
            owner_id,
            title: self.title,
            description: self.description,
            property_type: self.property_type,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            country: self.country.or_else(|| Some(DEFAULT_COUNTRY.to_string())),
            price: self.price,
            square_footage: self.square_footage,
            lot_size: self.lot_size,
            year_built: self.year_built,
            zoning: self.zoning,
            status: self.status.unwrap_or_else(|| STATUS_FOR_SALE.to_string()),
            cap_rate: self.cap_rate,
            noi: self.noi,
            broker_name: self.broker_name,
            broker_phone: self.broker_phone,
            broker_email: self.broker_email,
            virtual_tour_url: self.virtual_tour_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HomeFeed {
    pub featured: Vec<Property>,
    pub latest: Vec<Property>,
}

/// GET /api/v1/properties
///
/// Filtered, paginated search. Every supplied predicate must match.
pub async fn search(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    meta: ClientMeta,
    Query(filter): Query<PropertyFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<PageResponse<Property>>> {
    let resolved = filter.resolve()?;
    let (limit, offset) = page.resolve();

    let properties = PropertyRepo::search(&state.pool, &resolved, limit, offset).await?;
    let total = PropertyRepo::count(&state.pool, &resolved).await?;

    if let Some(user_id) = viewer.user_id() {
        if !filter.is_empty() {
            record_activity(
                &state.pool,
                user_id,
                ACTIVITY_SEARCH,
                "Property search",
                &meta,
                json!({ "filters": filter, "results": total }),
            )
            .await;
        }
    }

    Ok(Json(PageResponse {
        data: properties,
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/properties/home
pub async fn home_feed(State(state): State<AppState>) -> AppResult<Json<DataResponse<HomeFeed>>> {
    let featured = PropertyRepo::list_featured(&state.pool, HOME_FEATURED_COUNT).await?;
    let latest = PropertyRepo::list_latest(&state.pool, HOME_LATEST_COUNT).await?;
    Ok(Json(DataResponse {
        data: HomeFeed { featured, latest },
    }))
}

/// GET /api/v1/properties/mine
pub async fn list_mine(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Property>>>> {
    let properties = PropertyRepo::list_by_owner(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse { data: properties }))
}

/// POST /api/v1/properties
pub async fn create(
    State(state): State<AppState>,
    RequireBroker(user): RequireBroker,
    meta: ClientMeta,
    Json(input): Json<CreatePropertyRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Property>>)> {
    input.validate()?;
    let create = input.into_create(user.user_id);
    validate_status(&create.status)?;
    validate_numbers(&create.numbers(), Utc::now().year())?;

    let property = PropertyRepo::create(&state.pool, &create).await?;
    tracing::info!(property_id = property.id, owner_id = user.user_id, "Property created");

    record_activity(
        &state.pool,
        user.user_id,
        ACTIVITY_PROPERTY_CREATE,
        format!("Created property: {}", property.title),
        &meta,
        json!({ "property_id": property.id }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: property })))
}

/// GET /api/v1/properties/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Property>>> {
    let property = find_property(&state, id).await?;
    Ok(Json(DataResponse { data: property }))
}

/// PUT /api/v1/properties/{id}
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    meta: ClientMeta,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProperty>,
) -> AppResult<Json<DataResponse<Property>>> {
    let existing = find_property(&state, id).await?;
    auth_user.ensure_owner(existing.owner_id)?;

    if let Some(status) = input.status.as_deref() {
        validate_status(status)?;
    }
    validate_numbers(&input.numbers(), Utc::now().year())?;

    let property = PropertyRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Property",
            id,
        }))?;

    record_activity(
        &state.pool,
        auth_user.user_id,
        ACTIVITY_PROPERTY_UPDATE,
        format!("Updated property: {}", property.title),
        &meta,
        json!({ "property_id": id }),
    )
    .await;

    Ok(Json(DataResponse { data: property }))
}

/// DELETE /api/v1/properties/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth_user: AuthUser,
    meta: ClientMeta,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find_property(&state, id).await?;
    auth_user.ensure_owner(existing.owner_id)?;

    PropertyRepo::delete(&state.pool, id).await?;
    record_activity(
        &state.pool,
        auth_user.user_id,
        ACTIVITY_PROPERTY_DELETE,
        format!("Deleted property: {}", existing.title),
        &meta,
        json!({ "property_id": id }),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Saved searches
// ---------------------------------------------------------------------------

/// POST /api/v1/saved-searches
pub async fn create_saved_search(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateSavedSearch>,
) -> AppResult<(StatusCode, Json<DataResponse<SavedSearch>>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Saved search name is required".into(),
        )));
    }
    // Reject filters that could never run.
    input.filters.resolve()?;

    let saved = SavedSearchRepo::create(&state.pool, auth_user.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: saved })))
}

/// GET /api/v1/saved-searches
pub async fn list_saved_searches(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<SavedSearch>>>> {
    let rows = SavedSearchRepo::list_for_user(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// DELETE /api/v1/saved-searches/{id}
pub async fn delete_saved_search(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if SavedSearchRepo::delete_for_user(&state.pool, id, auth_user.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "SavedSearch",
            id,
        }))
    }
}

pub(crate) async fn find_property(state: &AppState, id: DbId) -> AppResult<Property> {
    PropertyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Property",
            id,
        }))
}
