//! # GoingOn
//!
//! A REST backend for city-local news diaries. Registered users post news
//! under a (city, date) diary entry, attach an image to their own news, and
//! vote on anyone's news.
//!
//! ## Features
//!
//! - **Users**: registration, profile read/update/delete behind HTTP Basic auth
//! - **News**: CRUD scoped to a diary entry, with author-only modification
//! - **Images**: PNG/JPEG uploads re-encoded to PNG with a derived thumbnail
//! - **Hot news and votes**: 1-5 votes accumulate into a rating
//! - **Pluggable storage**: in-memory or S3-compatible object storage
//!
//! ## Architecture
//!
//! - [`model`] - Domain records and the city whitelist
//! - [`entities`] - JSON request and response types
//! - [`validation`] - Input and business checks, run in a fixed order
//! - [`storage`] - Storage traits with memory and S3 backends
//! - [`images`] - Image decoding, re-encoding and thumbnails
//! - [`server`] - Axum routes, handlers and authentication
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use goingon::{
//!     create_router, AppState, ImageCodec, MemoryBlobStore, MemoryNewsStorage,
//!     MemoryUserStorage, NewsImageRepository, RouterConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let images = NewsImageRepository::new(Arc::new(MemoryBlobStore::new()), ImageCodec::default());
//!     let state = AppState::new(
//!         Arc::new(MemoryUserStorage::new()),
//!         Arc::new(MemoryNewsStorage::new()),
//!         images,
//!     );
//!     let router = create_router(state, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod entities;
pub mod error;
pub mod images;
pub mod model;
pub mod server;
pub mod storage;
pub mod validation;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, Command, ServeConfig, StorageBackend};
pub use error::{ApiError, ImageError, StorageError, ValidationError};
pub use images::{ImageCodec, NewsImageRepository};
pub use model::{City, News, NewsKey, User};
pub use server::{
    create_router, AppState, AuthenticatedUser, CredentialVerifier, ErrorResponse, RouterConfig,
    StorageCredentialVerifier,
};
pub use storage::{
    BlobStore, MemoryBlobStore, MemoryNewsStorage, MemoryUserStorage, NewsStorage, S3BlobStore,
    S3NewsStorage, S3ObjectStore, S3UserStorage, UserStorage,
};
