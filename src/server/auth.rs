//! HTTP Basic authentication.
//!
//! Protected handlers take an [`AuthenticatedUser`] argument. The extractor
//! reads the `Authorization` header, decodes the credentials and asks the
//! [`CredentialVerifier`] stored in the application state whether they
//! identify a user. Requests without a valid principal are rejected with
//! `401 Unauthorized` before any handler logic runs.
//!
//! ```text
//! Authorization: Basic base64("{nickname}:{password}")
//! ```
//!
//! # Security Properties
//!
//! - **Constant-time comparison**: stored and supplied passwords are compared
//!   with `subtle`, so the response time does not depend on where they differ
//! - **No hashing**: passwords are stored as given; deployments must terminate
//!   TLS in front of the service

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::error::{ApiError, StorageError};
use crate::storage::UserStorage;

use super::handlers::ErrorResponse;

/// Realm advertised in `WWW-Authenticate` challenges.
pub const REALM: &str = "GoingOn";

// =============================================================================
// Types
// =============================================================================

/// Authentication error types.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// No `Authorization` header
    MissingCredentials,

    /// Header present but not `Basic base64(nickname:password)`
    MalformedCredentials,

    /// Unknown user or wrong password
    InvalidCredentials,

    /// Credential lookup failed
    Storage(StorageError),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "Missing credentials"),
            AuthError::MalformedCredentials => write!(f, "Malformed Basic credentials"),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::Storage(e) => write!(f, "Credential lookup failed: {}", e),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let error_type = match &self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::MalformedCredentials => "malformed_credentials",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Storage(e) => return ApiError::Storage(e.clone()).into_response(),
        };
        let status = StatusCode::UNAUTHORIZED;
        let message = self.to_string();

        // Bad passwords could indicate guessing, missing headers are routine
        match &self {
            AuthError::InvalidCredentials => warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Authentication failed: {}",
                message
            ),
            _ => debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Authentication failed: {}",
                message
            ),
        }

        let challenge = format!("Basic realm=\"{}\"", REALM);
        let mut response =
            (status, Json(ErrorResponse::with_status(error_type, message, status))).into_response();
        if let Ok(value) = HeaderValue::from_str(&challenge) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }
}

/// Nickname and password decoded from a Basic `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub nickname: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("nickname", &self.nickname)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity established by a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub nickname: String,
}

/// Decode `Basic base64(nickname:password)`.
///
/// The scheme is matched case-insensitively. The password is everything
/// after the first `:` and may itself contain colons.
pub fn parse_basic_credentials(header_value: &str) -> Result<Credentials, AuthError> {
    let (scheme, encoded) = header_value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MalformedCredentials)?;

    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(AuthError::MalformedCredentials);
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AuthError::MalformedCredentials)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredentials)?;

    let (nickname, password) = decoded
        .split_once(':')
        .ok_or(AuthError::MalformedCredentials)?;

    if nickname.is_empty() {
        return Err(AuthError::MalformedCredentials);
    }

    Ok(Credentials {
        nickname: nickname.to_string(),
        password: password.to_string(),
    })
}

// =============================================================================
// Credential Verification
// =============================================================================

/// Decides whether a set of credentials identifies a user.
///
/// Handlers depend on this trait rather than on a storage backend so that
/// the credential source can be swapped independently.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Returns the principal for valid credentials and `None` otherwise.
    async fn verify(&self, credentials: &Credentials) -> Result<Option<Principal>, StorageError>;
}

/// Verifies credentials against the passwords held in [`UserStorage`].
#[derive(Clone)]
pub struct StorageCredentialVerifier {
    users: Arc<dyn UserStorage>,
}

impl StorageCredentialVerifier {
    pub fn new(users: Arc<dyn UserStorage>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl CredentialVerifier for StorageCredentialVerifier {
    async fn verify(&self, credentials: &Credentials) -> Result<Option<Principal>, StorageError> {
        let user = match self.users.get_user(&credentials.nickname).await {
            Ok(user) => user,
            Err(StorageError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let matches: bool = user
            .password
            .as_bytes()
            .ct_eq(credentials.password.as_bytes())
            .into();

        Ok(matches.then(|| Principal {
            nickname: user.nickname,
        }))
    }
}

// =============================================================================
// Axum Extractor
// =============================================================================

/// The authenticated caller of a protected endpoint.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub nickname: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<dyn CredentialVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingCredentials)?
            .to_str()
            .map_err(|_| AuthError::MalformedCredentials)?;

        let credentials = parse_basic_credentials(header_value)?;

        let verifier = Arc::<dyn CredentialVerifier>::from_ref(state);
        let principal = verifier
            .verify(&credentials)
            .await
            .map_err(AuthError::Storage)?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(AuthenticatedUser {
            nickname: principal.nickname,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
