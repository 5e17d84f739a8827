//! Hypermedia links and URI builders.
//!
//! Relative paths have no leading slash (`api/user/alice`); absolute links
//! are built by joining them onto a base URL taken from the request's
//! `Host` and `X-Forwarded-Proto` headers.

use http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

use crate::model::{City, NewsKey, DATE_FORMAT};

/// Fallback host when a request carries no `Host` header.
pub const DEFAULT_HOST: &str = "localhost:3000";

/// A link attached to a response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
        }
    }
}

/// `api/user/{nickname}`
pub fn user_path(nickname: &str) -> String {
    format!("api/user/{}", urlencoding::encode(nickname))
}

/// `api/city/{city}/date/{date}`
pub fn diary_entry_path(city: City, date: chrono::NaiveDate) -> String {
    format!("api/city/{}/date/{}", city, date.format(DATE_FORMAT))
}

/// `api/city/{city}/date/{date}/news/{id}`
pub fn news_path(key: &NewsKey) -> String {
    format!("{}/news/{}", diary_entry_path(key.city, key.date), key.id)
}

/// `api/city/{city}/date/{date}/news/{id}/image`
pub fn news_image_path(key: &NewsKey) -> String {
    format!("{}/image", news_path(key))
}

/// `api/city/{city}/date/{date}/news/{id}/image/thumbnail`
pub fn news_thumbnail_path(key: &NewsKey) -> String {
    format!("{}/thumbnail", news_image_path(key))
}

/// Derive `scheme://host` from the request headers.
///
/// The scheme comes from `X-Forwarded-Proto` when running behind a proxy,
/// otherwise `http`.
pub fn base_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or(DEFAULT_HOST);

    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("http");

    format!("{}://{}", proto, host)
}

/// Join a relative path onto a base URL.
pub fn absolute(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
