use http::StatusCode;
use thiserror::Error;

/// Errors raised by user, news and blob storage backends
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Entity or blob does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Error reported by the storage service itself
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Network or connection error while talking to the storage service
    #[error("Connection error: {0}")]
    Connection(String),

    /// Stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Errors raised while validating or transforming uploaded images
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    /// Content type does not name a supported image format
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// Bytes are not a decodable image
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Decoded image format differs from the declared content type
    #[error("Image format mismatch: declared {declared}, detected {detected}")]
    FormatMismatch { declared: String, detected: String },

    /// Re-encoding the image or its thumbnail failed
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Validation failures carrying the HTTP status they translate to.
///
/// `Input` covers malformed request shape (bad path parameters, bad bodies).
/// `Business` covers state conflicts: missing resources, duplicates and
/// ownership violations.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("{message}")]
    Input { status: StatusCode, message: String },

    #[error("{message}")]
    Business { status: StatusCode, message: String },
}

impl ValidationError {
    /// Input validation error, always HTTP 400.
    pub fn input(message: impl Into<String>) -> Self {
        ValidationError::Input {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Business validation error with an explicit status.
    pub fn business(status: StatusCode, message: impl Into<String>) -> Self {
        ValidationError::Business {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::business(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::business(StatusCode::UNAUTHORIZED, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::business(StatusCode::BAD_REQUEST, message)
    }

    /// HTTP status this error translates to.
    pub fn status(&self) -> StatusCode {
        match self {
            ValidationError::Input { status, .. } | ValidationError::Business { status, .. } => {
                *status
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ValidationError::Input { message, .. } | ValidationError::Business { message, .. } => {
                message
            }
        }
    }
}

/// Top-level error returned by every API handler
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),
}
