//! Handlers for `/auth` and `/account`: registration, token lifecycle and
//! the caller's own profile.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use estate_core::analytics::{ACTIVITY_LOGIN, ACTIVITY_LOGOUT, ACTIVITY_PROFILE_UPDATE};
use estate_core::error::CoreError;
use estate_core::roles::{validate_user_type, ROLE_BUYER};
use estate_core::types::DbId;
use estate_db::models::analytics::UserActivity;
use estate_db::models::notification::EmailNotification;
use estate_db::models::session::NewRefreshSession;
use estate_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use estate_db::repositories::{EmailNotificationRepo, SessionRepo, UserActivityRepo, UserRepo};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::activity::{record_activity, ClientMeta};
use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Consecutive failed logins before the account is locked.
const MAX_FAILED_ATTEMPTS: i32 = 5;

const LOCK_DURATION_MINS: i64 = 15;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters"))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirm: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[validate(length(max = 20, message = "Phone number is too long"))]
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub user_type: Option<String>,
    #[serde(default)]
    pub agree_terms: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    #[validate(length(max = 20, message = "Phone number is too long"))]
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub user_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    meta: ClientMeta,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    input.validate()?;

    if !input.agree_terms {
        return Err(AppError::Core(CoreError::Validation(
            "You must agree to the terms of service".into(),
        )));
    }
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let user_type = input.user_type.as_deref().unwrap_or(ROLE_BUYER);
    validate_user_type(user_type)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let now = Utc::now();
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
            phone_number: input.phone_number,
            address: input.address,
            user_type: user_type.to_string(),
            agree_terms: true,
            terms_accepted_at: Some(now),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, user_type = %user.user_type, "User registered");

    let response = create_auth_response(&state, &user, &meta).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    meta: ClientMeta,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if user.locked_until.is_some_and(|until| until > Utc::now()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is temporarily locked. Try again later.".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        UserRepo::increment_failed_login(&state.pool, user.id).await?;
        if user.failed_login_count + 1 >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, "Account locked after repeated failed logins");
        }
        return Err(invalid_credentials());
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    record_activity(
        &state.pool,
        user.id,
        ACTIVITY_LOGIN,
        "User logged in",
        &meta,
        json!({}),
    )
    .await;

    let response = create_auth_response(&state, &user, &meta).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Rotates the refresh token: the presented session is revoked and a new one
/// issued. Presenting a token that was already rotated revokes every session
/// of its user.
pub async fn refresh(
    State(state): State<AppState>,
    meta: ClientMeta,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let invalid =
        || AppError::Core(CoreError::Unauthorized("Invalid or expired refresh token".into()));

    let token_hash = hash_refresh_token(&input.refresh_token);
    let session = SessionRepo::find_by_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(invalid)?;

    if session.is_reused() {
        let revoked = SessionRepo::revoke_all_for_user(&state.pool, session.user_id).await?;
        tracing::warn!(
            user_id = session.user_id,
            session_id = session.id,
            revoked,
            "Refresh token reused, all sessions revoked"
        );
        return Err(invalid());
    }
    if !session.is_live(Utc::now()) {
        return Err(invalid());
    }

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let (refresh_token, next) = new_session(&state, user.id, &meta);
    SessionRepo::rotate(&state.pool, session.id, &next)
        .await?
        .ok_or_else(invalid)?;

    Ok(Json(auth_response(&state, &user, refresh_token)?))
}

/// POST /api/v1/auth/logout
///
/// Revokes every session of the caller.
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    meta: ClientMeta,
) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    record_activity(
        &state.pool,
        auth_user.user_id,
        ACTIVITY_LOGOUT,
        "User logged out",
        &meta,
        json!({ "sessions_revoked": revoked }),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/account/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = load_user(&state, auth_user.user_id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// PUT /api/v1/account/profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    meta: ClientMeta,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;
    if let Some(user_type) = input.user_type.as_deref() {
        validate_user_type(user_type)?;
    }

    let update = UpdateUser {
        email: input.email.map(|e| e.trim().to_lowercase()),
        first_name: input.first_name,
        last_name: input.last_name,
        phone_number: input.phone_number,
        address: input.address,
        user_type: input.user_type,
        is_active: None,
    };
    let user = UserRepo::update(&state.pool, auth_user.user_id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;

    record_activity(
        &state.pool,
        user.id,
        ACTIVITY_PROFILE_UPDATE,
        "Profile updated",
        &meta,
        json!({}),
    )
    .await;

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// POST /api/v1/account/password
///
/// Verifies the old password, stores the new hash and revokes all sessions.
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let user = load_user(&state, auth_user.user_id).await?;

    let old_valid = verify_password(&input.old_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !old_valid {
        return Err(AppError::Core(CoreError::Validation(
            "Your old password was entered incorrectly".into(),
        )));
    }

    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &hash).await?;
    SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;

    tracing::info!(user_id = user.id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/account/activity
pub async fn list_activity(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<UserActivity>>>> {
    let (limit, _) = params.resolve();
    let rows = UserActivityRepo::list_for_user(&state.pool, auth_user.user_id, limit).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/account/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<EmailNotification>>>> {
    let (limit, _) = params.resolve();
    let rows = EmailNotificationRepo::list_for_user(&state.pool, auth_user.user_id, limit).await?;
    Ok(Json(DataResponse { data: rows }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid username or password".into(),
    ))
}

pub(crate) async fn load_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

/// Open a refresh session for `user` and build the login response.
async fn create_auth_response(
    state: &AppState,
    user: &User,
    meta: &ClientMeta,
) -> AppResult<AuthResponse> {
    let (refresh_token, session) = new_session(state, user.id, meta);
    SessionRepo::create(&state.pool, &session).await?;
    auth_response(state, user, refresh_token)
}

/// A fresh refresh token and the session row that stores its hash.
fn new_session(state: &AppState, user_id: DbId, meta: &ClientMeta) -> (String, NewRefreshSession) {
    let (plaintext, token_hash) = generate_refresh_token();
    let session = NewRefreshSession {
        user_id,
        token_hash,
        expires_at: Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days),
        user_agent: Some(meta.user_agent.clone()).filter(|ua| !ua.is_empty()),
        ip_address: meta.ip_address.clone(),
    };
    (plaintext, session)
}

fn auth_response(state: &AppState, user: &User, refresh_token: String) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, user.role(), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: UserResponse::from(user),
    })
}
