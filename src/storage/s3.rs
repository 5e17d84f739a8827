//! S3-backed storage.
//!
//! Users and news are stored as JSON documents, blobs as raw objects, all in
//! a single bucket under an optional key prefix:
//!
//! ```text
//! {prefix}users/{nickname}.json
//! {prefix}news/{city}/{yyyy-MM-dd}/{id}.json
//! {prefix}images/{blob name}
//! ```
//!
//! The news key layout mirrors the `(city, date)` partition so a diary entry
//! can be listed with a single prefix scan. Writes are unconditional PUTs and
//! rely on S3's last-write-wins semantics.

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::NaiveDate;
use tracing::debug;

use crate::error::StorageError;
use crate::model::{City, News, NewsKey, User, DATE_FORMAT};

use super::{BlobStore, NewsStorage, UserStorage};

const JSON_CONTENT_TYPE: &str = "application/json";
const BLOB_CONTENT_TYPE: &str = "image/png";

// =============================================================================
// Client
// =============================================================================

/// Create an S3 client with optional custom endpoint and region.
///
/// Use a custom endpoint for S3-compatible services like MinIO:
/// ```ignore
/// let client = create_s3_client(Some("http://localhost:9000"), "us-east-1").await;
/// ```
pub async fn create_s3_client(endpoint_url: Option<&str>, region: &str) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);

    if let Some(endpoint) = endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;

    // S3-compatible services generally need path-style addressing
    let builder = aws_sdk_s3::config::Builder::from(&sdk_config);
    let s3_config = if endpoint_url.is_some() {
        builder.force_path_style(true).build()
    } else {
        builder.build()
    };

    Client::from_conf(s3_config)
}

fn sdk_error<E, R>(err: SdkError<E, R>) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            StorageError::Connection(message)
        }
        _ => StorageError::Backend(message),
    }
}

// =============================================================================
// Object Store
// =============================================================================

/// Thin wrapper around a bucket and key prefix.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3ObjectStore {
    /// Create a store rooted at `prefix` within `bucket`.
    ///
    /// A non-empty prefix is normalized to end with `/`.
    pub fn new(client: Client, bucket: impl Into<String>, prefix: Option<&str>) -> Self {
        let prefix = match prefix.map(|p| p.trim_matches('/')) {
            Some(p) if !p.is_empty() => format!("{}/", p),
            _ => String::new(),
        };
        Self {
            client,
            bucket: bucket.into(),
            prefix,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn full_key(&self, path: &str) -> String {
        format!("{}{}", self.prefix, path)
    }

    /// Fetch an object body.
    pub async fn get(&self, path: &str) -> Result<Bytes, StorageError> {
        let key = self.full_key(path);
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                let is_not_found = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false)
                    || e.raw_response()
                        .map(|r| r.status().as_u16() == 404)
                        .unwrap_or(false);

                if is_not_found {
                    StorageError::NotFound(format!("s3://{}/{}", self.bucket, key))
                } else {
                    sdk_error(e)
                }
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .into_bytes();

        Ok(data)
    }

    pub async fn put(&self, path: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        let key = self.full_key(path);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(sdk_error)?;

        debug!(bucket = %self.bucket, key = %key, "Stored object");
        Ok(())
    }

    /// HEAD an object, mapping a 404 to `false`.
    pub async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(self.full_key(path))
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) => {
                let is_not_found = e
                    .as_service_error()
                    .map(|se| se.is_not_found())
                    .unwrap_or(false)
                    || e.raw_response()
                        .map(|r| r.status().as_u16() == 404)
                        .unwrap_or(false);

                if is_not_found {
                    Ok(false)
                } else {
                    Err(sdk_error(e))
                }
            }
        }
    }

    pub async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(self.full_key(path))
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    /// List object paths (relative to the store prefix) under `path_prefix`.
    pub async fn list(&self, path_prefix: &str) -> Result<Vec<String>, StorageError> {
        let full_prefix = self.full_key(path_prefix);
        let mut paths = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&full_prefix)
                .max_keys(1000);

            if let Some(token) = continuation_token {
                request = request.continuation_token(token);
            }

            let result = request.send().await.map_err(sdk_error)?;

            for obj in result.contents() {
                if let Some(key) = obj.key() {
                    if let Some(relative) = key.strip_prefix(&self.prefix) {
                        paths.push(relative.to_string());
                    }
                }
            }

            if result.is_truncated() == Some(true) {
                continuation_token = result.next_continuation_token().map(|s| s.to_string());
            } else {
                break;
            }
        }

        Ok(paths)
    }

    /// Connectivity probe used by the `check` command.
    pub async fn ping(&self) -> Result<(), StorageError> {
        self.client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(1)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, StorageError> {
        let data = self.get(path).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    async fn put_json<T: serde::Serialize>(&self, path: &str, value: &T) -> Result<(), StorageError> {
        let data = serde_json::to_vec(value)?;
        self.put(path, Bytes::from(data), JSON_CONTENT_TYPE).await
    }
}

// =============================================================================
// Key Layout
// =============================================================================

fn user_object(nickname: &str) -> String {
    format!("users/{}.json", urlencoding::encode(nickname))
}

fn diary_prefix(city: City, date: NaiveDate) -> String {
    format!("news/{}/{}/", city, date.format(DATE_FORMAT))
}

fn news_object(key: &NewsKey) -> String {
    format!("{}{}.json", diary_prefix(key.city, key.date), key.id)
}

fn blob_object(name: &str) -> String {
    format!("images/{}", urlencoding::encode(name))
}

// =============================================================================
// Users
// =============================================================================

#[derive(Clone)]
pub struct S3UserStorage {
    store: S3ObjectStore,
}

impl S3UserStorage {
    pub fn new(store: S3ObjectStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserStorage for S3UserStorage {
    async fn add_user(&self, user: User) -> Result<(), StorageError> {
        let path = user_object(&user.nickname);
        if self.store.exists(&path).await? {
            return Err(StorageError::Backend(format!(
                "user '{}' already exists",
                user.nickname
            )));
        }
        self.store.put_json(&path, &user).await
    }

    async fn get_user(&self, nickname: &str) -> Result<User, StorageError> {
        self.store.get_json(&user_object(nickname)).await
    }

    async fn contains_user(&self, nickname: &str) -> Result<bool, StorageError> {
        self.store.exists(&user_object(nickname)).await
    }

    async fn update_user(&self, user: User) -> Result<(), StorageError> {
        let path = user_object(&user.nickname);
        if !self.store.exists(&path).await? {
            return Err(StorageError::NotFound(format!("user '{}'", user.nickname)));
        }
        self.store.put_json(&path, &user).await
    }

    async fn delete_user(&self, nickname: &str) -> Result<(), StorageError> {
        self.store.delete(&user_object(nickname)).await
    }
}

// =============================================================================
// News
// =============================================================================

#[derive(Clone)]
pub struct S3NewsStorage {
    store: S3ObjectStore,
}

impl S3NewsStorage {
    pub fn new(store: S3ObjectStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NewsStorage for S3NewsStorage {
    async fn add_news(&self, news: News) -> Result<(), StorageError> {
        self.store.put_json(&news_object(&news.key()), &news).await
    }

    async fn get_news(&self, key: &NewsKey) -> Result<News, StorageError> {
        self.store.get_json(&news_object(key)).await
    }

    async fn contains_news(&self, key: &NewsKey) -> Result<bool, StorageError> {
        self.store.exists(&news_object(key)).await
    }

    async fn contains_news_with_content(&self, news: &News) -> Result<bool, StorageError> {
        let existing = self.list_news(news.city, news.date).await?;
        Ok(existing.iter().any(|n| n.same_content(news)))
    }

    async fn update_news(&self, news: News) -> Result<(), StorageError> {
        let path = news_object(&news.key());
        if !self.store.exists(&path).await? {
            return Err(StorageError::NotFound(format!("news '{}'", news.id)));
        }
        self.store.put_json(&path, &news).await
    }

    async fn delete_news(&self, key: &NewsKey) -> Result<(), StorageError> {
        self.store.delete(&news_object(key)).await
    }

    async fn list_news(&self, city: City, date: NaiveDate) -> Result<Vec<News>, StorageError> {
        let paths = self.store.list(&diary_prefix(city, date)).await?;
        let mut news = Vec::with_capacity(paths.len());
        for path in paths.iter().filter(|p| p.ends_with(".json")) {
            match self.store.get_json::<News>(path).await {
                Ok(item) => news.push(item),
                // Deleted between LIST and GET
                Err(StorageError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(news)
    }
}

// =============================================================================
// Blobs
// =============================================================================

#[derive(Clone)]
pub struct S3BlobStore {
    store: S3ObjectStore,
}

impl S3BlobStore {
    pub fn new(store: S3ObjectStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put_blob(&self, name: &str, data: Bytes) -> Result<(), StorageError> {
        self.store
            .put(&blob_object(name), data, BLOB_CONTENT_TYPE)
            .await
    }

    async fn get_blob(&self, name: &str) -> Result<Bytes, StorageError> {
        self.store.get(&blob_object(name)).await
    }

    async fn contains_blob(&self, name: &str) -> Result<bool, StorageError> {
        self.store.exists(&blob_object(name)).await
    }

    async fn delete_blob(&self, name: &str) -> Result<(), StorageError> {
        self.store.delete(&blob_object(name)).await
    }
}
