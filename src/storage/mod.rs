//! Storage abstraction for users, news and binary blobs.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                    Handlers / Validation                       │
//! │        Arc<dyn UserStorage>  Arc<dyn NewsStorage>              │
//! │                  Arc<dyn BlobStore>                            │
//! └───────────────┬───────────────────────────────┬────────────────┘
//!                 │                               │
//!     ┌───────────▼──────────┐        ┌───────────▼──────────────┐
//!     │       memory         │        │            s3            │
//!     │ RwLock<HashMap<..>>  │        │ JSON documents + blobs   │
//!     │ (tests, dev)         │        │ in an S3 bucket          │
//!     └──────────────────────┘        └──────────────────────────┘
//! ```
//!
//! Handles are constructed once at startup and injected into the router
//! state. No implementation uses optimistic concurrency: concurrent writes
//! to the same key are last-write-wins.

pub mod memory;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;

use crate::error::StorageError;
use crate::model::{City, News, NewsKey, User};

pub use memory::{MemoryBlobStore, MemoryNewsStorage, MemoryUserStorage};
pub use s3::{create_s3_client, S3BlobStore, S3NewsStorage, S3ObjectStore, S3UserStorage};

/// Persistence of registered users, keyed by nickname.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Insert a new user. Fails if the nickname is taken.
    async fn add_user(&self, user: User) -> Result<(), StorageError>;

    /// Fetch a user, returning `StorageError::NotFound` when absent.
    async fn get_user(&self, nickname: &str) -> Result<User, StorageError>;

    async fn contains_user(&self, nickname: &str) -> Result<bool, StorageError>;

    /// Replace an existing user.
    async fn update_user(&self, user: User) -> Result<(), StorageError>;

    async fn delete_user(&self, nickname: &str) -> Result<(), StorageError>;
}

/// Persistence of news items, partitioned by diary entry.
#[async_trait]
pub trait NewsStorage: Send + Sync {
    async fn add_news(&self, news: News) -> Result<(), StorageError>;

    /// Fetch a news item, returning `StorageError::NotFound` when absent.
    async fn get_news(&self, key: &NewsKey) -> Result<News, StorageError>;

    async fn contains_news(&self, key: &NewsKey) -> Result<bool, StorageError>;

    /// Whether a news with the same diary entry, title and author exists.
    async fn contains_news_with_content(&self, news: &News) -> Result<bool, StorageError>;

    /// Replace an existing news item.
    async fn update_news(&self, news: News) -> Result<(), StorageError>;

    async fn delete_news(&self, key: &NewsKey) -> Result<(), StorageError>;

    /// All news of a diary entry, in no particular order.
    async fn list_news(&self, city: City, date: NaiveDate) -> Result<Vec<News>, StorageError>;
}

/// Flat key/value store for binary blobs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put_blob(&self, name: &str, data: Bytes) -> Result<(), StorageError>;

    /// Fetch a blob, returning `StorageError::NotFound` when absent.
    async fn get_blob(&self, name: &str) -> Result<Bytes, StorageError>;

    async fn contains_blob(&self, name: &str) -> Result<bool, StorageError>;

    /// Delete a blob. Deleting a missing blob is not an error.
    async fn delete_blob(&self, name: &str) -> Result<(), StorageError>;
}
