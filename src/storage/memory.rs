//! In-memory storage backends.
//!
//! Each store is a `tokio::sync::RwLock` around a `HashMap`, so handles can
//! be shared freely between request tasks. Contents are lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StorageError;
use crate::model::{City, News, NewsKey, User};

use super::{BlobStore, NewsStorage, UserStorage};

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryUserStorage {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStorage for MemoryUserStorage {
    async fn add_user(&self, user: User) -> Result<(), StorageError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.nickname) {
            return Err(StorageError::Backend(format!(
                "user '{}' already exists",
                user.nickname
            )));
        }
        debug!(nickname = %user.nickname, "Stored user");
        users.insert(user.nickname.clone(), user);
        Ok(())
    }

    async fn get_user(&self, nickname: &str) -> Result<User, StorageError> {
        self.users
            .read()
            .await
            .get(nickname)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("user '{}'", nickname)))
    }

    async fn contains_user(&self, nickname: &str) -> Result<bool, StorageError> {
        Ok(self.users.read().await.contains_key(nickname))
    }

    async fn update_user(&self, user: User) -> Result<(), StorageError> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.nickname) {
            Some(existing) => {
                *existing = user;
                Ok(())
            }
            None => Err(StorageError::NotFound(format!("user '{}'", user.nickname))),
        }
    }

    async fn delete_user(&self, nickname: &str) -> Result<(), StorageError> {
        self.users
            .write()
            .await
            .remove(nickname)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(format!("user '{}'", nickname)))
    }
}

// =============================================================================
// News
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryNewsStorage {
    news: RwLock<HashMap<NewsKey, News>>,
}

impl MemoryNewsStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NewsStorage for MemoryNewsStorage {
    async fn add_news(&self, news: News) -> Result<(), StorageError> {
        let mut all = self.news.write().await;
        let key = news.key();
        if all.contains_key(&key) {
            return Err(StorageError::Backend(format!("news '{}' already exists", key.id)));
        }
        all.insert(key, news);
        Ok(())
    }

    async fn get_news(&self, key: &NewsKey) -> Result<News, StorageError> {
        self.news
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("news '{}'", key.id)))
    }

    async fn contains_news(&self, key: &NewsKey) -> Result<bool, StorageError> {
        Ok(self.news.read().await.contains_key(key))
    }

    async fn contains_news_with_content(&self, news: &News) -> Result<bool, StorageError> {
        Ok(self
            .news
            .read()
            .await
            .values()
            .any(|existing| existing.same_content(news)))
    }

    async fn update_news(&self, news: News) -> Result<(), StorageError> {
        let mut all = self.news.write().await;
        match all.get_mut(&news.key()) {
            Some(existing) => {
                *existing = news;
                Ok(())
            }
            None => Err(StorageError::NotFound(format!("news '{}'", news.id))),
        }
    }

    async fn delete_news(&self, key: &NewsKey) -> Result<(), StorageError> {
        self.news
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(format!("news '{}'", key.id)))
    }

    async fn list_news(&self, city: City, date: NaiveDate) -> Result<Vec<News>, StorageError> {
        Ok(self
            .news
            .read()
            .await
            .values()
            .filter(|n| n.city == city && n.date == date)
            .cloned()
            .collect())
    }
}

// =============================================================================
// Blobs
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Bytes>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put_blob(&self, name: &str, data: Bytes) -> Result<(), StorageError> {
        self.blobs.write().await.insert(name.to_string(), data);
        Ok(())
    }

    async fn get_blob(&self, name: &str) -> Result<Bytes, StorageError> {
        self.blobs
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("blob '{}'", name)))
    }

    async fn contains_blob(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.blobs.read().await.contains_key(name))
    }

    async fn delete_blob(&self, name: &str) -> Result<(), StorageError> {
        self.blobs.write().await.remove(name);
        Ok(())
    }
}
