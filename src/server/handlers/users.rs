//! User registration and self-service endpoints.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::info;

use crate::entities::{
    absolute, base_url, user_path, CreateUserRequest, UpdateUserRequest, UserResponse,
};
use crate::error::{ApiError, ValidationError};
use crate::server::auth::AuthenticatedUser;
use crate::validation::business::{
    is_authorized_user, is_valid_create_user, is_valid_delete_user, is_valid_get_user,
    is_valid_update_user,
};
use crate::validation::input::{is_valid_user, is_valid_user_profile};
use crate::validation::validate_nickname;

use super::{created, parse_json, AppState, UserPath};

const USER_FORMAT_INCORRECT: &str = "The user format is incorrect";
const USER_NOT_FOUND: &str = "The user is not in the database";

// =============================================================================
// Validation Order
// =============================================================================

/// body shape (400) → not registered (400)
async fn validate_create_user(
    state: &AppState,
    body: &[u8],
) -> Result<(String, CreateUserRequest), ApiError> {
    let request: Option<CreateUserRequest> = parse_json(body);
    let request = match request {
        Some(r) if is_valid_user(Some(&r)) => r,
        _ => return Err(ValidationError::input(USER_FORMAT_INCORRECT).into()),
    };

    let nickname = request.nickname.clone().unwrap_or_default();
    if !is_valid_create_user(state.users.as_ref(), &nickname).await? {
        return Err(ValidationError::bad_request(format!(
            "The user {} is already registered",
            nickname
        ))
        .into());
    }

    Ok((nickname, request))
}

/// nickname (400) → exists (404)
async fn validate_get_user(state: &AppState, nickname: &str) -> Result<(), ApiError> {
    validate_nickname(nickname)?;

    if !is_valid_get_user(state.users.as_ref(), nickname).await? {
        return Err(ValidationError::not_found(USER_NOT_FOUND).into());
    }
    Ok(())
}

/// nickname (400) → body shape (400) → authorized (401) → exists (404)
async fn validate_update_user(
    state: &AppState,
    requester: &str,
    nickname: &str,
    body: &[u8],
) -> Result<UpdateUserRequest, ApiError> {
    validate_nickname(nickname)?;

    let request: Option<UpdateUserRequest> = parse_json(body);
    let request = match request {
        Some(r) if is_valid_user_profile(Some(&r)) => r,
        _ => return Err(ValidationError::input(USER_FORMAT_INCORRECT).into()),
    };

    if !is_authorized_user(requester, nickname) {
        return Err(ValidationError::unauthorized(format!(
            "The user {} is not authorized to update the user {}",
            requester, nickname
        ))
        .into());
    }

    if !is_valid_update_user(state.users.as_ref(), nickname).await? {
        return Err(ValidationError::not_found(USER_NOT_FOUND).into());
    }

    Ok(request)
}

/// nickname (400) → authorized (401) → exists (404)
async fn validate_delete_user(
    state: &AppState,
    requester: &str,
    nickname: &str,
) -> Result<(), ApiError> {
    validate_nickname(nickname)?;

    if !is_authorized_user(requester, nickname) {
        return Err(ValidationError::unauthorized(format!(
            "The user {} is not authorized to delete the user {}",
            requester, nickname
        ))
        .into());
    }

    if !is_valid_delete_user(state.users.as_ref(), nickname).await? {
        return Err(ValidationError::not_found(USER_NOT_FOUND).into());
    }
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new user.
///
/// # Endpoint
///
/// `POST /api/user`
///
/// # Response
///
/// - `201 Created` with `Location: {base}/api/user/{nickname}`
/// - `400 Bad Request`: malformed body or nickname already registered
pub async fn create_user_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let (nickname, request) = validate_create_user(&state, &body).await?;

    let user = request.profile.to_user(&nickname, Utc::now())?;
    state.users.add_user(user).await?;

    info!(nickname = %nickname, "Registered user");
    Ok(created(absolute(&base_url(&headers), &user_path(&nickname))))
}

/// Fetch a user profile. Any authenticated user may read any profile.
///
/// # Endpoint
///
/// `GET /api/user/{nickname}`
///
/// # Response
///
/// - `200 OK` with a `UserResponse` body
/// - `400 Bad Request`: blank nickname
/// - `401 Unauthorized`: missing or invalid credentials
/// - `404 Not Found`: unknown nickname
pub async fn get_user_handler(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(path): Path<UserPath>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    validate_get_user(&state, &path.nickname).await?;

    let user = state.users.get_user(&path.nickname).await?;
    Ok(Json(UserResponse::from_user(user, &base_url(&headers))))
}

/// Replace the caller's own profile. The registration date is kept.
///
/// # Endpoint
///
/// `PATCH /api/user/{nickname}`
///
/// # Response
///
/// - `204 No Content`
/// - `400 Bad Request`: blank nickname or malformed body
/// - `401 Unauthorized`: bad credentials or someone else's account
/// - `404 Not Found`: unknown nickname
pub async fn update_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(path): Path<UserPath>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = validate_update_user(&state, &user.nickname, &path.nickname, &body).await?;

    let existing = state.users.get_user(&path.nickname).await?;
    let updated = request.to_user(&path.nickname, existing.registration_date)?;
    state.users.update_user(updated).await?;

    info!(nickname = %path.nickname, "Updated user");
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Delete the caller's own account. News written by the user are kept.
///
/// # Endpoint
///
/// `DELETE /api/user/{nickname}`
///
/// # Response
///
/// - `204 No Content`
/// - `400 Bad Request`: blank nickname
/// - `401 Unauthorized`: bad credentials or someone else's account
/// - `404 Not Found`: unknown nickname
pub async fn delete_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(path): Path<UserPath>,
) -> Result<Response, ApiError> {
    validate_delete_user(&state, &user.nickname, &path.nickname).await?;

    state.users.delete_user(&path.nickname).await?;

    info!(nickname = %path.nickname, "Deleted user");
    Ok(StatusCode::NO_CONTENT.into_response())
}
