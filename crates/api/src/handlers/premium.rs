//! Handlers for premium listings: plans, checkout, the owner's dashboard and
//! the admin side of listings and promo codes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use estate_core::analytics::ACTIVITY_PREMIUM_PURCHASE;
use estate_core::error::CoreError;
use estate_core::payment::{new_admin_payment_id, PaymentMethod, PaymentOutcome, VALID_PAYMENT_METHODS};
use estate_core::premium::{
    plan_catalog, validate_payment_status, PlanInfo, PlanType, UPCOMING_WINDOW_DAYS,
};
use estate_core::promo::{normalize_code, validate_new_code, DiscountType};
use estate_core::types::{DbId, Money, Timestamp};
use estate_db::models::premium::{
    ActivatePremiumListing, PremiumCounts, PremiumListingView, PremiumNoticeTarget,
    PremiumPropertyStats, UpdatePremiumListing,
};
use estate_db::models::promo_code::{CreatePromoCode, PromoCode, UpdatePromoCode};
use estate_db::models::property::Property;
use estate_db::repositories::{PremiumListingRepo, PromoCodeRepo, PropertyRepo};
use estate_events::{ListingSubject, Notifier, Recipient};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::activity::{record_activity, ClientMeta};
use crate::error::{AppError, AppResult};
use crate::handlers::accounts::load_user;
use crate::handlers::properties::find_property;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Upcoming expirations shown on the admin summary.
const UPCOMING_LIMIT: i64 = 10;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub plans: Vec<PlanInfo>,
    pub payment_methods: &'static [&'static str],
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub property_id: DbId,
    pub plan_type: String,
    pub payment_method: String,
    pub promo_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub listing: PremiumListingView,
    pub original_price: Money,
    pub amount_paid: Money,
    pub promo_code: Option<String>,
    pub payment_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PromoPreviewRequest {
    pub code: String,
    pub plan_type: String,
}

#[derive(Debug, Serialize)]
pub struct PromoPreview {
    pub code: String,
    pub discount_type: String,
    pub discount_value: Decimal,
    pub original_price: Money,
    pub discounted_price: Money,
}

#[derive(Debug, Serialize)]
pub struct PremiumDashboard {
    pub active_listings: Vec<PremiumListingView>,
    pub expiring_soon: usize,
    /// Owned properties without an active premium listing.
    pub eligible_properties: Vec<Property>,
}

#[derive(Debug, Serialize)]
pub struct PremiumAnalyticsRow {
    #[serde(flatten)]
    pub stats: PremiumPropertyStats,
    pub conversion_rate: f64,
}

#[derive(Debug, Deserialize)]
pub struct AdminListParams {
    #[serde(default)]
    pub active_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AdminCreateListing {
    pub property_id: DbId,
    pub plan_type: String,
    /// Defaults to the plan price.
    pub amount_paid: Option<Money>,
    /// Defaults to now + plan duration.
    pub end_date: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct PremiumSummary {
    #[serde(flatten)]
    pub counts: PremiumCounts,
    pub upcoming_expirations: Vec<PremiumNoticeTarget>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePromoCodeRequest {
    pub code: String,
    pub discount_type: String,
    pub discount_value: Decimal,
    pub valid_from: Timestamp,
    pub valid_until: Timestamp,
    pub max_uses: Option<i32>,
}

// ---------------------------------------------------------------------------
// Public / owner
// ---------------------------------------------------------------------------

/// GET /api/v1/premium/plans
pub async fn plans() -> Json<DataResponse<PlansResponse>> {
    Json(DataResponse {
        data: PlansResponse {
            plans: plan_catalog(),
            payment_methods: VALID_PAYMENT_METHODS,
        },
    })
}

/// POST /api/v1/premium/promo/preview
///
/// Price a plan with a promo code. Does not consume a use.
pub async fn preview_promo(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(input): Json<PromoPreviewRequest>,
) -> AppResult<Json<DataResponse<PromoPreview>>> {
    let plan: PlanType = input.plan_type.parse()?;
    let promo = find_valid_promo(&state, &input.code, Utc::now()).await?;
    let terms = promo.terms()?;

    Ok(Json(DataResponse {
        data: PromoPreview {
            code: promo.code,
            discount_type: promo.discount_type,
            discount_value: promo.discount_value,
            original_price: plan.price(),
            discounted_price: terms.apply_discount(plan.price()),
        },
    }))
}

/// POST /api/v1/premium/checkout
///
/// Charge the simulated gateway and activate the listing on success. A
/// declined charge answers 402 and leaves listing state untouched.
pub async fn checkout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    meta: ClientMeta,
    Json(input): Json<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CheckoutResponse>>)> {
    let plan: PlanType = input.plan_type.parse()?;
    let method: PaymentMethod = input.payment_method.parse()?;

    let property = find_property(&state, input.property_id).await?;
    if property.owner_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only purchase premium for your own properties".into(),
        )));
    }
    if PremiumListingRepo::has_active(&state.pool, property.id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "This property already has an active premium listing".into(),
        )));
    }

    let now = Utc::now();
    let original_price = plan.price();
    let promo = match input.promo_code.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(code) => Some(find_valid_promo(&state, code, now).await?),
        None => None,
    };
    let amount = match &promo {
        Some(p) => p.terms()?.apply_discount(original_price),
        None => original_price,
    };

    let user = load_user(&state, auth_user.user_id).await?;
    let recipient = Recipient::new(user.id, user.display_name(), &user.email);
    let subject = ListingSubject {
        property_id: property.id,
        property_title: &property.title,
    };

    let (payment_id, reference, details) = match state.gateway.charge(method, amount, now) {
        PaymentOutcome::Approved {
            payment_id,
            reference,
            details,
        } => (payment_id, reference, details),
        PaymentOutcome::Declined { payment_id, error } => {
            tracing::warn!(
                property_id = property.id,
                user_id = user.id,
                payment_id = %payment_id,
                method = method.as_str(),
                "Simulated payment declined"
            );
            let entry = state
                .notifier
                .payment_failed(&recipient, subject, plan, amount, &payment_id, &error)
                .await;
            Notifier::record(&state.pool, &entry).await;
            return Err(AppError::Core(CoreError::PaymentFailed(error)));
        }
    };

    let listing = PremiumListingRepo::activate(
        &state.pool,
        &ActivatePremiumListing {
            property_id: property.id,
            user_id: user.id,
            plan_type: plan.as_str().to_string(),
            amount_paid: amount,
            payment_id: payment_id.clone(),
            payment_method: method.as_str().to_string(),
            payment_reference: Some(reference),
            payment_details: details,
            start_date: now,
            end_date: plan.end_date_from(now),
        },
    )
    .await?
    .ok_or_else(|| {
        tracing::error!(
            property_id = property.id,
            payment_id = %payment_id,
            "Payment approved but listing became active concurrently"
        );
        AppError::Core(CoreError::Conflict(
            "This property already has an active premium listing".into(),
        ))
    })?;

    if let Some(p) = &promo {
        match PromoCodeRepo::redeem(&state.pool, &p.code, now).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!(
                code = %p.code,
                payment_id = %payment_id,
                "Promo code no longer redeemable after payment"
            ),
            Err(e) => tracing::error!(code = %p.code, error = %e, "Failed to redeem promo code"),
        }
    }

    let entry = state
        .notifier
        .premium_activated(&recipient, subject, &listing)
        .await;
    Notifier::record(&state.pool, &entry).await;

    record_activity(
        &state.pool,
        user.id,
        ACTIVITY_PREMIUM_PURCHASE,
        format!("Purchased {} for {}", plan.display_name(), property.title),
        &meta,
        json!({
            "listing_id": listing.id,
            "plan_type": plan.as_str(),
            "amount": amount.to_string(),
            "payment_id": payment_id,
        }),
    )
    .await;

    tracing::info!(
        listing_id = listing.id,
        property_id = property.id,
        plan = plan.as_str(),
        amount = %amount,
        "Premium listing activated"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CheckoutResponse {
                listing: PremiumListingView::new(listing, now),
                original_price,
                amount_paid: amount,
                promo_code: promo.map(|p| p.code),
                payment_id,
            },
        }),
    ))
}

/// GET /api/v1/premium/listings
pub async fn list_mine(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<PremiumListingView>>>> {
    let now = Utc::now();
    let listings = PremiumListingRepo::list_for_user(&state.pool, auth_user.user_id)
        .await?
        .into_iter()
        .map(|l| PremiumListingView::new(l, now))
        .collect();
    Ok(Json(DataResponse { data: listings }))
}

/// GET /api/v1/premium/listings/{id}
pub async fn get_listing(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PremiumListingView>>> {
    let listing = PremiumListingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PremiumListing",
            id,
        }))?;
    auth_user.ensure_owner(listing.user_id)?;
    Ok(Json(DataResponse {
        data: PremiumListingView::new(listing, Utc::now()),
    }))
}

/// DELETE /api/v1/premium/listings/{id}
pub async fn delete_listing(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let listing = PremiumListingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PremiumListing",
            id,
        }))?;
    auth_user.ensure_owner(listing.user_id)?;

    PremiumListingRepo::delete(&state.pool, id).await?;
    tracing::info!(listing_id = id, property_id = listing.property_id, "Premium listing deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/premium/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<PremiumDashboard>>> {
    let now = Utc::now();
    let active_listings: Vec<PremiumListingView> =
        PremiumListingRepo::list_for_user(&state.pool, auth_user.user_id)
            .await?
            .into_iter()
            .filter(|l| l.is_active)
            .map(|l| PremiumListingView::new(l, now))
            .collect();
    let expiring_soon = active_listings.iter().filter(|l| l.is_expiring_soon).count();

    let eligible_properties = PropertyRepo::list_by_owner(&state.pool, auth_user.user_id)
        .await?
        .into_iter()
        .filter(|p| !p.is_premium)
        .collect();

    Ok(Json(DataResponse {
        data: PremiumDashboard {
            active_listings,
            expiring_soon,
            eligible_properties,
        },
    }))
}

/// GET /api/v1/premium/analytics
pub async fn analytics(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<PremiumAnalyticsRow>>>> {
    let rows = PremiumListingRepo::property_stats_for_user(&state.pool, auth_user.user_id)
        .await?
        .into_iter()
        .map(|stats| PremiumAnalyticsRow {
            conversion_rate: stats.conversion_rate(),
            stats,
        })
        .collect();
    Ok(Json(DataResponse { data: rows }))
}

// ---------------------------------------------------------------------------
// Admin: listings
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/premium/listings
pub async fn admin_list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<AdminListParams>,
) -> AppResult<Json<DataResponse<Vec<PremiumListingView>>>> {
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();
    let now = Utc::now();
    let listings = PremiumListingRepo::list(&state.pool, params.active_only, limit, offset)
        .await?
        .into_iter()
        .map(|l| PremiumListingView::new(l, now))
        .collect();
    Ok(Json(DataResponse { data: listings }))
}

/// POST /api/v1/admin/premium/listings
///
/// Grant a listing without payment.
pub async fn admin_create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<AdminCreateListing>,
) -> AppResult<(StatusCode, Json<DataResponse<PremiumListingView>>)> {
    let plan: PlanType = input.plan_type.parse()?;
    let property = find_property(&state, input.property_id).await?;

    let now = Utc::now();
    let end_date = input.end_date.unwrap_or_else(|| plan.end_date_from(now));
    if end_date <= now {
        return Err(AppError::Core(CoreError::Validation(
            "end_date must be in the future".into(),
        )));
    }

    let listing = PremiumListingRepo::activate(
        &state.pool,
        &ActivatePremiumListing {
            property_id: property.id,
            user_id: property.owner_id,
            plan_type: plan.as_str().to_string(),
            amount_paid: input.amount_paid.unwrap_or_else(|| plan.price()),
            payment_id: new_admin_payment_id(),
            payment_method: PaymentMethod::Cash.as_str().to_string(),
            payment_reference: None,
            payment_details: json!({ "granted_by": "admin", "admin_id": admin.user_id }),
            start_date: now,
            end_date,
        },
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "This property already has an active premium listing".into(),
        ))
    })?;

    tracing::info!(listing_id = listing.id, admin_id = admin.user_id, "Premium listing granted");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: PremiumListingView::new(listing, now),
        }),
    ))
}

/// PUT /api/v1/admin/premium/listings/{id}
pub async fn admin_update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePremiumListing>,
) -> AppResult<Json<DataResponse<PremiumListingView>>> {
    if let Some(plan) = input.plan_type.as_deref() {
        plan.parse::<PlanType>()?;
    }
    if let Some(status) = input.payment_status.as_deref() {
        validate_payment_status(status)?;
    }

    let listing = PremiumListingRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PremiumListing",
            id,
        }))?;
    Ok(Json(DataResponse {
        data: PremiumListingView::new(listing, Utc::now()),
    }))
}

/// GET /api/v1/admin/premium/summary
pub async fn admin_summary(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<PremiumSummary>>> {
    let now = Utc::now();
    let counts = PremiumListingRepo::counts(&state.pool, now).await?;
    let upcoming_expirations = PremiumListingRepo::upcoming_expirations(
        &state.pool,
        now,
        now + Duration::days(UPCOMING_WINDOW_DAYS),
        UPCOMING_LIMIT,
    )
    .await?;
    Ok(Json(DataResponse {
        data: PremiumSummary {
            counts,
            upcoming_expirations,
        },
    }))
}

// ---------------------------------------------------------------------------
// Admin: promo codes
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/promo-codes
pub async fn list_promo_codes(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<PromoCode>>>> {
    let codes = PromoCodeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: codes }))
}

/// POST /api/v1/admin/promo-codes
pub async fn create_promo_code(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreatePromoCodeRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PromoCode>>)> {
    let discount_type: DiscountType = input.discount_type.parse()?;
    validate_new_code(
        &input.code,
        discount_type,
        input.discount_value,
        input.valid_from,
        input.valid_until,
        input.max_uses,
    )?;

    let code = PromoCodeRepo::create(
        &state.pool,
        &CreatePromoCode {
            code: normalize_code(&input.code),
            discount_type: discount_type.as_str().to_string(),
            discount_value: input.discount_value,
            valid_from: input.valid_from,
            valid_until: input.valid_until,
            max_uses: input.max_uses,
            created_by: Some(admin.user_id),
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: code })))
}

/// PUT /api/v1/admin/promo-codes/{id}
pub async fn update_promo_code(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePromoCode>,
) -> AppResult<Json<DataResponse<PromoCode>>> {
    if input.max_uses.is_some_and(|m| m < 1) {
        return Err(AppError::Core(CoreError::Validation(
            "max_uses must be at least 1".into(),
        )));
    }
    let code = PromoCodeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PromoCode",
            id,
        }))?;
    Ok(Json(DataResponse { data: code }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_valid_promo(state: &AppState, code: &str, now: Timestamp) -> AppResult<PromoCode> {
    let promo = PromoCodeRepo::find_by_code(&state.pool, &normalize_code(code))
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Validation("Invalid promo code".into())))?;
    if !promo.terms()?.is_valid(now) {
        return Err(AppError::Core(CoreError::Validation(
            "Promo code has expired or reached its usage limit".into(),
        )));
    }
    Ok(promo)
}
