use axum::{
    extract::{FromRef, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        cookies::{build_auth_cookie, clear_auth_cookie},
        extractors::{AdminUser, CurrentUser},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::ApiError,
    state::AppState,
    users::{
        dto::{
            AdminUpdateRequest, LoginRequest, MessageResponse, PublicUser, SignupRequest,
            UpdateProfileRequest, UserResponse,
        },
        repo::UserSummary,
    },
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        warn!("empty name");
        return Err(ApiError::Validation("Name cannot be empty".into()));
    }
    Ok(name.to_string())
}

fn normalize_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim();
    if !is_valid_email(email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    Ok(email.to_string())
}

fn cookie_header(cookie: String) -> Result<HeaderMap, ApiError> {
    let value = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("set-cookie header: {e}")))?;
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

/// Sign a token for the user and wrap it in the auth cookie header.
fn issue_cookie(state: &AppState, user_id: Uuid) -> Result<HeaderMap, ApiError> {
    let keys = JwtKeys::from_ref(state);
    let token = keys.sign(user_id)?;
    cookie_header(build_auth_cookie(
        &token,
        keys.ttl,
        state.config.cookie_secure,
    ))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, HeaderMap, Json<UserResponse>), ApiError> {
    let name = normalize_name(&payload.name)?;
    let email = normalize_email(&payload.email)?;
    if payload.password.is_empty() {
        warn!("empty password");
        return Err(ApiError::Validation("Password cannot be empty".into()));
    }

    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Validation(format!(
            "User with email {email} already exists"
        )));
    }

    let hash = hash_password(&payload.password)?;
    // The unique index settles a signup race the pre-check above missed.
    let user = state.users.create(&name, &email, &hash).await?;

    let headers = issue_cookie(&state, user.id)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        headers,
        Json(UserResponse {
            message: "User registered".into(),
            user: PublicUser::from(user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<UserResponse>), ApiError> {
    let email = normalize_email(&payload.email)?;

    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| {
            warn!(email = %email, "login unknown email");
            ApiError::Validation(format!("{email} is not registered"))
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Validation("Invalid password".into()));
    }

    let headers = issue_cookie(&state, user.id)?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((
        headers,
        Json(UserResponse {
            message: "Login successful".into(),
            user: PublicUser::from(user),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<(HeaderMap, Json<MessageResponse>), ApiError> {
    let headers = cookie_header(clear_auth_cookie(state.config.cookie_secure))?;
    info!(user_id = %user.id, "user logged out");
    Ok((
        headers,
        Json(MessageResponse {
            message: "Logged out".into(),
        }),
    ))
}

#[instrument(skip(user))]
pub async fn get_profile(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let name = payload.name.as_deref().map(normalize_name).transpose()?;
    let email = payload.email.as_deref().map(normalize_email).transpose()?;
    // Re-hash only when a new plaintext arrives.
    let password_hash = match payload.password.as_deref() {
        Some("") => {
            warn!("empty password");
            return Err(ApiError::Validation("Password cannot be empty".into()));
        }
        Some(plain) => Some(hash_password(plain)?),
        None => None,
    };

    let updated = state
        .users
        .update_profile(
            user.id,
            name.as_deref(),
            email.as_deref(),
            password_hash.as_deref(),
        )
        .await?
        .ok_or_else(|| {
            warn!(user_id = %user.id, "profile update on vanished user");
            ApiError::NotFound("User not found".into())
        })?;

    info!(user_id = %updated.id, "profile updated");
    Ok(Json(UserResponse {
        message: "Profile updated".into(),
        user: PublicUser::from(updated),
    }))
}

#[instrument(skip(state, admin))]
pub async fn list_users(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let users = state.users.list_all().await?;
    info!(admin_id = %admin.0.id, count = users.len(), "users listed");
    Ok(Json(users))
}

#[instrument(skip(state, admin, payload))]
pub async fn admin_update_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminUpdateRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let name = payload.name.as_deref().map(normalize_name).transpose()?;
    let email = payload.email.as_deref().map(normalize_email).transpose()?;

    let updated = state
        .users
        .admin_update(id, name.as_deref(), email.as_deref(), payload.is_admin)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(admin_id = %admin.0.id, user_id = %updated.id, "user updated by admin");
    Ok(Json(UserResponse {
        message: "User updated".into(),
        user: PublicUser::from(updated),
    }))
}

#[instrument(skip(state, admin))]
pub async fn admin_delete_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let target = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if target.is_admin {
        warn!(admin_id = %admin.0.id, target_id = %target.id, "refused to delete admin");
        return Err(ApiError::Validation("Cannot delete an admin user".into()));
    }

    state.users.delete(target.id).await?;
    info!(admin_id = %admin.0.id, target_id = %target.id, "user deleted");
    Ok(Json(MessageResponse {
        message: "User deleted".into(),
    }))
}
