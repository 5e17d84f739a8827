//! HTTP server layer for GoingOn.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │       /api/user/...          /api/city/{city}/date/{date}/...   │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │    auth     │  │        routes           │  │
//! │  │ (validate → │  │ (HTTP Basic)│  │  (router config)        │  │
//! │  │  execute)   │  │             │  │                         │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod routes;

pub use auth::{
    parse_basic_credentials, AuthError, AuthenticatedUser, CredentialVerifier, Credentials,
    Principal, StorageCredentialVerifier,
};
pub use handlers::{
    health_handler, AppState, DiaryEntryPath, ErrorResponse, HealthResponse, NewsPath, UserPath,
};
pub use routes::{create_router, RouterConfig, DEFAULT_MAX_BODY_SIZE};
