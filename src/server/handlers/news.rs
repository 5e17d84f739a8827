//! News endpoints: CRUD on a diary entry plus hot news and voting.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::entities::{absolute, base_url, news_path, NewsRequest, NewsResponse, VoteRequest};
use crate::error::{ApiError, ValidationError};
use crate::model::{News, NewsKey};
use crate::server::auth::AuthenticatedUser;
use crate::validation::business::{is_valid_create_news, is_valid_get_hot_news};
use crate::validation::input::{is_valid_news, is_valid_vote};
use crate::validation::{validate_diary_entry_parameters, validate_news_parameters};

use super::{
    created, ensure_author, ensure_news_exists, parse_json, AppState, DiaryEntryPath, NewsPath,
};

/// Maximum number of items returned by the hot news endpoint.
pub const HOT_NEWS_LIMIT: usize = 10;

const NEWS_FORMAT_INCORRECT: &str = "The news format is incorrect";

// =============================================================================
// Validation Order
// =============================================================================

fn parse_news_body(body: &[u8]) -> Result<(String, String), ValidationError> {
    match parse_json::<NewsRequest>(body) {
        Some(request) if is_valid_news(Some(&request)) => Ok((
            request.title.unwrap_or_default(),
            request.content.unwrap_or_default(),
        )),
        _ => Err(ValidationError::input(NEWS_FORMAT_INCORRECT)),
    }
}

/// diary params (400) → body shape (400) → not duplicate (400)
async fn validate_create_news(
    state: &AppState,
    author: &str,
    path: &DiaryEntryPath,
    body: &[u8],
) -> Result<News, ApiError> {
    let (city, date) = validate_diary_entry_parameters(&path.city, &path.date)?;
    let (title, content) = parse_news_body(body)?;

    let news = News::new(title, content, author, city, date);
    if !is_valid_create_news(state.news.as_ref(), &news).await? {
        return Err(ValidationError::bad_request("The news is already created").into());
    }
    Ok(news)
}

/// params (400) → body shape (400) → exists (404) → author (401)
async fn validate_update_news(
    state: &AppState,
    requester: &str,
    path: &NewsPath,
    body: &[u8],
) -> Result<(NewsKey, String, String), ApiError> {
    let key = validate_news_parameters(&path.city, &path.date, &path.news_id)?;
    let (title, content) = parse_news_body(body)?;

    ensure_news_exists(state, &key).await?;
    ensure_author(state, &key, requester, "update this news").await?;

    Ok((key, title, content))
}

/// params (400) → exists (404) → author (401)
async fn validate_delete_news(
    state: &AppState,
    requester: &str,
    path: &NewsPath,
) -> Result<NewsKey, ApiError> {
    let key = validate_news_parameters(&path.city, &path.date, &path.news_id)?;

    ensure_news_exists(state, &key).await?;
    ensure_author(state, &key, requester, "delete this news").await?;

    Ok(key)
}

/// params (400) → vote shape (400) → exists (404)
async fn validate_vote_news(
    state: &AppState,
    path: &NewsPath,
    body: &[u8],
) -> Result<(NewsKey, i32), ApiError> {
    let key = validate_news_parameters(&path.city, &path.date, &path.news_id)?;

    let vote: Option<VoteRequest> = parse_json(body);
    let value = match vote {
        Some(VoteRequest { value }) if is_valid_vote(value) => value,
        _ => {
            return Err(
                ValidationError::input("The vote must be an integer between 1 and 5").into(),
            )
        }
    };

    ensure_news_exists(state, &key).await?;
    Ok((key, value))
}

// =============================================================================
// Handlers
// =============================================================================

/// List the news of a diary entry, ordered by title.
///
/// # Endpoint
///
/// `GET /api/city/{city}/date/{date}/news`
///
/// # Response
///
/// - `200 OK` with a JSON array of `NewsResponse` (possibly empty)
/// - `400 Bad Request`: invalid city or date
pub async fn list_news_handler(
    State(state): State<AppState>,
    Path(path): Path<DiaryEntryPath>,
    headers: HeaderMap,
) -> Result<Json<Vec<NewsResponse>>, ApiError> {
    let (city, date) = validate_diary_entry_parameters(&path.city, &path.date)?;

    let mut news = state.news.list_news(city, date).await?;
    news.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));

    let base = base_url(&headers);
    Ok(Json(
        news.into_iter()
            .map(|n| NewsResponse::from_news(n, &base))
            .collect(),
    ))
}

/// The highest rated news of a diary entry.
///
/// # Endpoint
///
/// `GET /api/city/{city}/date/{date}/hotnews`
///
/// # Response
///
/// - `200 OK` with up to [`HOT_NEWS_LIMIT`] items, rating descending
/// - `400 Bad Request`: invalid city or date
/// - `404 Not Found`: the diary entry has no news
pub async fn hot_news_handler(
    State(state): State<AppState>,
    Path(path): Path<DiaryEntryPath>,
    headers: HeaderMap,
) -> Result<Json<Vec<NewsResponse>>, ApiError> {
    let (city, date) = validate_diary_entry_parameters(&path.city, &path.date)?;

    if !is_valid_get_hot_news(state.news.as_ref(), city, date).await? {
        return Err(ValidationError::not_found("There are no news for this diary entry").into());
    }

    let mut news = state.news.list_news(city, date).await?;
    news.sort_by(|a, b| b.rating.cmp(&a.rating).then_with(|| a.title.cmp(&b.title)));
    news.truncate(HOT_NEWS_LIMIT);

    let base = base_url(&headers);
    Ok(Json(
        news.into_iter()
            .map(|n| NewsResponse::from_news(n, &base))
            .collect(),
    ))
}

/// Post a news item as the authenticated user.
///
/// # Endpoint
///
/// `POST /api/city/{city}/date/{date}/news`
///
/// # Response
///
/// - `201 Created` with `Location` pointing at the new item
/// - `400 Bad Request`: invalid parameters, malformed body or duplicate
/// - `401 Unauthorized`: missing or invalid credentials
pub async fn create_news_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(path): Path<DiaryEntryPath>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let news = validate_create_news(&state, &user.nickname, &path, &body).await?;
    let key = news.key();

    state.news.add_news(news).await?;

    info!(news_id = %key.id, city = %key.city, author = %user.nickname, "Created news");
    Ok(created(absolute(&base_url(&headers), &news_path(&key))))
}

/// Fetch a single news item.
///
/// # Endpoint
///
/// `GET /api/city/{city}/date/{date}/news/{news_id}`
///
/// # Response
///
/// - `200 OK` with a `NewsResponse` body
/// - `400 Bad Request`: invalid city, date or id
/// - `404 Not Found`: no such news
pub async fn get_news_handler(
    State(state): State<AppState>,
    Path(path): Path<NewsPath>,
    headers: HeaderMap,
) -> Result<Json<NewsResponse>, ApiError> {
    let key = validate_news_parameters(&path.city, &path.date, &path.news_id)?;
    ensure_news_exists(&state, &key).await?;

    let news = state.news.get_news(&key).await?;
    Ok(Json(NewsResponse::from_news(news, &base_url(&headers))))
}

/// Replace the title and content of a news item. Only its author may.
///
/// # Endpoint
///
/// `PATCH /api/city/{city}/date/{date}/news/{news_id}`
///
/// # Response
///
/// - `204 No Content`
/// - `400 Bad Request`: invalid parameters or malformed body
/// - `401 Unauthorized`: bad credentials or not the author
/// - `404 Not Found`: no such news
pub async fn update_news_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(path): Path<NewsPath>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let (key, title, content) = validate_update_news(&state, &user.nickname, &path, &body).await?;

    let mut news = state.news.get_news(&key).await?;
    news.title = title;
    news.content = content;
    state.news.update_news(news).await?;

    info!(news_id = %key.id, "Updated news");
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Delete a news item. Only its author may. The attached image is kept.
///
/// # Endpoint
///
/// `DELETE /api/city/{city}/date/{date}/news/{news_id}`
///
/// # Response
///
/// - `204 No Content`
/// - `400 Bad Request`: invalid city, date or id
/// - `401 Unauthorized`: bad credentials or not the author
/// - `404 Not Found`: no such news
pub async fn delete_news_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(path): Path<NewsPath>,
) -> Result<Response, ApiError> {
    let key = validate_delete_news(&state, &user.nickname, &path).await?;

    state.news.delete_news(&key).await?;

    info!(news_id = %key.id, "Deleted news");
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Add a 1-5 vote to a news item's rating.
///
/// # Endpoint
///
/// `POST /api/city/{city}/date/{date}/news/{news_id}/vote`
///
/// # Response
///
/// - `204 No Content`
/// - `400 Bad Request`: invalid parameters or vote outside 1-5
/// - `401 Unauthorized`: missing or invalid credentials
/// - `404 Not Found`: no such news
pub async fn vote_news_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(path): Path<NewsPath>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let (key, value) = validate_vote_news(&state, &path, &body).await?;

    let mut news = state.news.get_news(&key).await?;
    news.rating += i64::from(value);
    state.news.update_news(news).await?;

    info!(news_id = %key.id, voter = %user.nickname, value = value, "Recorded vote");
    Ok(StatusCode::NO_CONTENT.into_response())
}
