//! HTTP request handlers for the GoingOn API.
//!
//! Every handler follows the same shape: extract path and body into typed
//! request structs, run the input and business checks for the operation in
//! its fixed order, touch storage, and map the result to a response DTO.
//! All failures flow through the single [`ApiError`] to response translation
//! defined here.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - [`users`] - `/api/user[/{nickname}]`
//! - [`news`] - `/api/city/{city}/date/{date}/news[/{news_id}]`, hot news, votes
//! - [`images`] - `.../news/{news_id}/image[/thumbnail]`

pub mod images;
pub mod news;
pub mod users;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{ApiError, ImageError, StorageError, ValidationError};
use crate::images::NewsImageRepository;
use crate::model::NewsKey;
use crate::storage::{NewsStorage, UserStorage};
use crate::validation::business::{is_valid_get_news, is_valid_modify_news};

use super::auth::{CredentialVerifier, StorageCredentialVerifier};

pub use images::{
    create_news_image_handler, delete_news_image_handler, get_news_image_handler,
    get_news_thumbnail_handler,
};
pub use news::{
    create_news_handler, delete_news_handler, get_news_handler, hot_news_handler,
    list_news_handler, update_news_handler, vote_news_handler, HOT_NEWS_LIMIT,
};
pub use users::{create_user_handler, delete_user_handler, get_user_handler, update_user_handler};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state: storage handles and the credential verifier.
///
/// Built once at startup and passed to all handlers via Axum's State
/// extractor.
pub struct AppState {
    pub users: Arc<dyn UserStorage>,
    pub news: Arc<dyn NewsStorage>,
    pub images: Arc<NewsImageRepository>,
    pub credentials: Arc<dyn CredentialVerifier>,
}

impl AppState {
    /// Create state whose credentials are checked against `users`.
    pub fn new(
        users: Arc<dyn UserStorage>,
        news: Arc<dyn NewsStorage>,
        images: NewsImageRepository,
    ) -> Self {
        let credentials: Arc<dyn CredentialVerifier> =
            Arc::new(StorageCredentialVerifier::new(Arc::clone(&users)));
        Self {
            users,
            news,
            images: Arc::new(images),
            credentials,
        }
    }

    /// Replace the credential verifier.
    pub fn with_credential_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.credentials = verifier;
        self
    }
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            news: Arc::clone(&self.news),
            images: Arc::clone(&self.images),
            credentials: Arc::clone(&self.credentials),
        }
    }
}

impl FromRef<AppState> for Arc<dyn CredentialVerifier> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.credentials)
    }
}

// =============================================================================
// Path Parameters
// =============================================================================

/// Extracted from: `/api/user/{nickname}`
#[derive(Debug, Deserialize)]
pub struct UserPath {
    pub nickname: String,
}

/// Extracted from: `/api/city/{city}/date/{date}/...`
#[derive(Debug, Deserialize)]
pub struct DiaryEntryPath {
    pub city: String,
    pub date: String,
}

/// Extracted from: `/api/city/{city}/date/{date}/news/{news_id}/...`
#[derive(Debug, Deserialize)]
pub struct NewsPath {
    pub city: String,
    pub date: String,
    pub news_id: String,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "invalid_request")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert ApiError to HTTP response.
///
/// Validation errors carry their own status. Storage and codec faults map
/// to 5xx, except decode failures of an upload which are the client's.
/// 5xx are logged at ERROR, 404 at DEBUG and other 4xx at WARN.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::Validation(err @ ValidationError::Input { .. }) => {
                (err.status(), "invalid_request", err.message().to_string())
            }
            ApiError::Validation(err @ ValidationError::Business { .. }) => {
                let error_type = match err.status() {
                    StatusCode::NOT_FOUND => "not_found",
                    StatusCode::UNAUTHORIZED => "unauthorized",
                    _ => "invalid_operation",
                };
                (err.status(), error_type, err.message().to_string())
            }

            ApiError::Storage(StorageError::NotFound(what)) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Resource not found: {}", what),
            ),
            ApiError::Storage(StorageError::Connection(msg)) => (
                StatusCode::BAD_GATEWAY,
                "connection_error",
                format!("Connection error: {}", msg),
            ),
            ApiError::Storage(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                err.to_string(),
            ),

            ApiError::Image(ImageError::Encode(msg)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "encode_error",
                format!("Failed to encode image: {}", msg),
            ),
            ApiError::Image(err) => (StatusCode::BAD_REQUEST, "invalid_image", err.to_string()),
        };

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Parse a JSON body, treating any malformed input as absent.
///
/// Shape validation then reports the missing body with the operation's own
/// message and at its own position in the check order.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Option<T> {
    serde_json::from_slice(body).ok()
}

/// 404 unless the news exists.
pub(crate) async fn ensure_news_exists(state: &AppState, key: &NewsKey) -> Result<(), ApiError> {
    if !is_valid_get_news(state.news.as_ref(), key).await? {
        return Err(ValidationError::not_found("The news is not in the database").into());
    }
    Ok(())
}

/// 401 unless `requester` wrote the news. `action` completes the message,
/// e.g. "update this news".
pub(crate) async fn ensure_author(
    state: &AppState,
    key: &NewsKey,
    requester: &str,
    action: &str,
) -> Result<(), ApiError> {
    if !is_valid_modify_news(state.news.as_ref(), key, requester).await? {
        return Err(ValidationError::unauthorized(format!(
            "The user {} is not authorized to {}",
            requester, action
        ))
        .into());
    }
    Ok(())
}

/// `201 Created` with a `Location` header.
pub(crate) fn created(location: String) -> Response {
    (StatusCode::CREATED, [(header::LOCATION, location)]).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
