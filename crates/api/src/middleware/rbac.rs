//! Role gates layered on [`AuthUser`].
//!
//! Each extractor authenticates the request first, then refuses it with 403
//! when the user type is not allowed. Handlers take the gate as an argument
//! so the requirement is visible in the signature.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use estate_core::error::CoreError;
use estate_core::roles::{can_list_properties, ROLE_ADMIN};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 otherwise.
///
/// ```ignore
/// async fn bulk_action(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     // admin.role == "admin"
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires `broker` or `admin`; buyers cannot create listings.
///
/// ```ignore
/// async fn create_listing(RequireBroker(owner): RequireBroker) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireBroker(pub AuthUser);

impl FromRequestParts<AppState> for RequireBroker {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !can_list_properties(&user.role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Only brokers can list properties".into(),
            )));
        }
        Ok(RequireBroker(user))
    }
}
