//! News image and thumbnail endpoints.
//!
//! Images are uploaded as raw bytes with a `Content-Type` of `image/png` or
//! `image/jpeg` and always served back as `image/png`.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use image::ImageFormat;
use tracing::info;

use crate::entities::{absolute, base_url, news_image_path};
use crate::error::{ApiError, ValidationError};
use crate::images::STORED_CONTENT_TYPE;
use crate::model::NewsKey;
use crate::server::auth::AuthenticatedUser;
use crate::validation::business::{is_valid_get_news_image, is_valid_get_news_thumbnail};
use crate::validation::{validate_image, validate_news_parameters};

use super::{created, ensure_author, ensure_news_exists, AppState, NewsPath};

const IMAGE_NOT_FOUND: &str = "The image is not in the database";

// =============================================================================
// Validation Order
// =============================================================================

async fn ensure_image_exists(state: &AppState, key: &NewsKey) -> Result<(), ApiError> {
    if !is_valid_get_news_image(&state.images, key).await? {
        return Err(ValidationError::not_found(IMAGE_NOT_FOUND).into());
    }
    Ok(())
}

/// params (400) → news (404) → image (404)
async fn validate_get_image(state: &AppState, path: &NewsPath) -> Result<NewsKey, ApiError> {
    let key = validate_news_parameters(&path.city, &path.date, &path.news_id)?;
    ensure_news_exists(state, &key).await?;
    ensure_image_exists(state, &key).await?;
    Ok(key)
}

/// params (400) → image valid (400) → news (404) → author (401) → no image yet (400)
async fn validate_create_image(
    state: &AppState,
    requester: &str,
    path: &NewsPath,
    content_type: &str,
    body: &[u8],
) -> Result<(NewsKey, ImageFormat), ApiError> {
    let key = validate_news_parameters(&path.city, &path.date, &path.news_id)?;
    let format = validate_image(body, content_type)?;

    ensure_news_exists(state, &key).await?;
    ensure_author(state, &key, requester, "modify the image of this news").await?;

    if is_valid_get_news_image(&state.images, &key).await? {
        return Err(ValidationError::bad_request("The image is already created").into());
    }

    Ok((key, format))
}

/// params (400) → news (404) → author (401) → image (404)
async fn validate_delete_image(
    state: &AppState,
    requester: &str,
    path: &NewsPath,
) -> Result<NewsKey, ApiError> {
    let key = validate_news_parameters(&path.city, &path.date, &path.news_id)?;

    ensure_news_exists(state, &key).await?;
    ensure_author(state, &key, requester, "modify the image of this news").await?;
    ensure_image_exists(state, &key).await?;

    Ok(key)
}

/// params (400) → news (404) → image (404) → thumbnail (404)
async fn validate_get_thumbnail(state: &AppState, path: &NewsPath) -> Result<NewsKey, ApiError> {
    let key = validate_get_image(state, path).await?;

    if !is_valid_get_news_thumbnail(&state.images, &key).await? {
        return Err(ValidationError::not_found("The thumbnail is not in the database").into());
    }
    Ok(key)
}

fn png_response(data: Bytes) -> Response {
    ([(header::CONTENT_TYPE, STORED_CONTENT_TYPE)], data).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Fetch the image attached to a news item.
///
/// # Endpoint
///
/// `GET /api/city/{city}/date/{date}/news/{news_id}/image`
///
/// # Response
///
/// - `200 OK` with `Content-Type: image/png`
/// - `400 Bad Request`: invalid city, date or id
/// - `404 Not Found`: no such news or no image
pub async fn get_news_image_handler(
    State(state): State<AppState>,
    Path(path): Path<NewsPath>,
) -> Result<Response, ApiError> {
    let key = validate_get_image(&state, &path).await?;
    let data = state.images.get_news_image(&key).await?;
    Ok(png_response(data))
}

/// Attach an image to a news item and derive its thumbnail.
///
/// # Endpoint
///
/// `POST /api/city/{city}/date/{date}/news/{news_id}/image`
///
/// The request body is the raw image; `Content-Type` must match its format.
///
/// # Response
///
/// - `201 Created` with `Location` pointing at the image
/// - `400 Bad Request`: invalid parameters, invalid image or image already present
/// - `401 Unauthorized`: bad credentials or not the news author
/// - `404 Not Found`: no such news
pub async fn create_news_image_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(path): Path<NewsPath>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    let (key, format) =
        validate_create_image(&state, &user.nickname, &path, content_type, &body).await?;

    state.images.create_news_image(&key, &body, format).await?;

    info!(news_id = %key.id, size = body.len(), "Stored news image");
    Ok(created(absolute(&base_url(&headers), &news_image_path(&key))))
}

/// Remove the image and thumbnail of a news item.
///
/// # Endpoint
///
/// `DELETE /api/city/{city}/date/{date}/news/{news_id}/image`
///
/// # Response
///
/// - `204 No Content`
/// - `400 Bad Request`: invalid city, date or id
/// - `401 Unauthorized`: bad credentials or not the news author
/// - `404 Not Found`: no such news or no image
pub async fn delete_news_image_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(path): Path<NewsPath>,
) -> Result<Response, ApiError> {
    let key = validate_delete_image(&state, &user.nickname, &path).await?;

    state.images.delete_news_image(&key).await?;

    info!(news_id = %key.id, "Deleted news image");
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Fetch the thumbnail derived from a news image.
///
/// # Endpoint
///
/// `GET /api/city/{city}/date/{date}/news/{news_id}/image/thumbnail`
///
/// # Response
///
/// - `200 OK` with `Content-Type: image/png`
/// - `400 Bad Request`: invalid city, date or id
/// - `404 Not Found`: no such news, image or thumbnail
pub async fn get_news_thumbnail_handler(
    State(state): State<AppState>,
    Path(path): Path<NewsPath>,
) -> Result<Response, ApiError> {
    let key = validate_get_thumbnail(&state, &path).await?;
    let data = state.images.get_news_thumbnail(&key).await?;
    Ok(png_response(data))
}
