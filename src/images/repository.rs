//! Blob-backed storage of news images.
//!
//! Each news item has at most one image, stored as PNG under
//! [`NewsKey::blob_name`], plus a thumbnail under
//! [`NewsKey::thumbnail_blob_name`].

use std::sync::Arc;

use bytes::Bytes;
use image::ImageFormat;
use tracing::{debug, warn};

use crate::error::{ApiError, StorageError};
use crate::model::NewsKey;
use crate::storage::BlobStore;

use super::codec::ImageCodec;

/// News images and their thumbnails on top of a [`BlobStore`].
///
/// The full image is always written before its thumbnail and removed after
/// it, so a thumbnail never outlives the image it was derived from.
#[derive(Clone)]
pub struct NewsImageRepository {
    blobs: Arc<dyn BlobStore>,
    codec: ImageCodec,
}

impl NewsImageRepository {
    pub fn new(blobs: Arc<dyn BlobStore>, codec: ImageCodec) -> Self {
        Self { blobs, codec }
    }

    pub fn codec(&self) -> &ImageCodec {
        &self.codec
    }

    /// Store a validated upload and its derived thumbnail.
    ///
    /// If the thumbnail cannot be written the image is removed again, so a
    /// failed upload can be retried.
    pub async fn create_news_image(
        &self,
        key: &NewsKey,
        data: &[u8],
        format: ImageFormat,
    ) -> Result<(), ApiError> {
        let prepared = self.codec.prepare(data, format)?;
        let blob_name = key.blob_name();

        self.blobs.put_blob(&blob_name, prepared.image).await?;

        if !self.blobs.contains_blob(&blob_name).await? {
            return Err(StorageError::Backend(format!(
                "image '{}' was not stored",
                blob_name
            ))
            .into());
        }

        if let Err(e) = self
            .blobs
            .put_blob(&key.thumbnail_blob_name(), prepared.thumbnail)
            .await
        {
            // Roll back so the upload can be retried.
            if let Err(cleanup) = self.blobs.delete_blob(&blob_name).await {
                warn!(blob = %blob_name, "Failed to roll back image: {}", cleanup);
            }
            return Err(e.into());
        }

        debug!(blob = %blob_name, "Stored news image and thumbnail");
        Ok(())
    }

    pub async fn get_news_image(&self, key: &NewsKey) -> Result<Bytes, StorageError> {
        self.blobs.get_blob(&key.blob_name()).await
    }

    pub async fn get_news_thumbnail(&self, key: &NewsKey) -> Result<Bytes, StorageError> {
        self.blobs.get_blob(&key.thumbnail_blob_name()).await
    }

    /// Remove the thumbnail, then the image.
    pub async fn delete_news_image(&self, key: &NewsKey) -> Result<(), StorageError> {
        self.blobs.delete_blob(&key.thumbnail_blob_name()).await?;
        self.blobs.delete_blob(&key.blob_name()).await
    }

    pub async fn contains_image(&self, key: &NewsKey) -> Result<bool, StorageError> {
        self.blobs.contains_blob(&key.blob_name()).await
    }

    pub async fn contains_thumbnail(&self, key: &NewsKey) -> Result<bool, StorageError> {
        self.blobs.contains_blob(&key.thumbnail_blob_name()).await
    }
}
