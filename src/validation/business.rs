//! Storage-backed checks run after input validation.
//!
//! Every predicate answers a single yes/no question about current state. The
//! handlers decide which status a `false` maps to and in which order the
//! predicates run for each operation.

use chrono::NaiveDate;

use crate::error::StorageError;
use crate::images::NewsImageRepository;
use crate::model::{City, News, NewsKey};
use crate::storage::{NewsStorage, UserStorage};

/// A nickname can be registered only if nobody holds it yet.
pub async fn is_valid_create_user(
    users: &dyn UserStorage,
    nickname: &str,
) -> Result<bool, StorageError> {
    Ok(!users.contains_user(nickname).await?)
}

pub async fn is_valid_get_user(
    users: &dyn UserStorage,
    nickname: &str,
) -> Result<bool, StorageError> {
    users.contains_user(nickname).await
}

pub async fn is_valid_update_user(
    users: &dyn UserStorage,
    nickname: &str,
) -> Result<bool, StorageError> {
    users.contains_user(nickname).await
}

pub async fn is_valid_delete_user(
    users: &dyn UserStorage,
    nickname: &str,
) -> Result<bool, StorageError> {
    users.contains_user(nickname).await
}

/// The authenticated principal may only act on its own account.
pub fn is_authorized_user(requester: &str, nickname: &str) -> bool {
    requester == nickname
}

/// Rejects duplicates: same diary entry, title and author.
pub async fn is_valid_create_news(
    news: &dyn NewsStorage,
    candidate: &News,
) -> Result<bool, StorageError> {
    Ok(!news.contains_news_with_content(candidate).await?)
}

pub async fn is_valid_get_news(news: &dyn NewsStorage, key: &NewsKey) -> Result<bool, StorageError> {
    news.contains_news(key).await
}

/// Only the author may modify or delete a news item.
///
/// A missing item is reported as not modifiable; callers that need to tell
/// the two apart check existence first.
pub async fn is_valid_modify_news(
    news: &dyn NewsStorage,
    key: &NewsKey,
    requester: &str,
) -> Result<bool, StorageError> {
    match news.get_news(key).await {
        Ok(item) => Ok(item.author == requester),
        Err(StorageError::NotFound(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Hot news exist for a diary entry when it holds at least one news item.
pub async fn is_valid_get_hot_news(
    news: &dyn NewsStorage,
    city: City,
    date: NaiveDate,
) -> Result<bool, StorageError> {
    Ok(!news.list_news(city, date).await?.is_empty())
}

pub async fn is_valid_get_news_image(
    images: &NewsImageRepository,
    key: &NewsKey,
) -> Result<bool, StorageError> {
    images.contains_image(key).await
}

pub async fn is_valid_get_news_thumbnail(
    images: &NewsImageRepository,
    key: &NewsKey,
) -> Result<bool, StorageError> {
    images.contains_thumbnail(key).await
}
