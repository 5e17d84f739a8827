//! Test utilities for integration tests.
//!
//! Builds a router over fresh in-memory storage and provides request
//! builders for the JSON and image endpoints.

use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http_body_util::BodyExt;
use image::{ImageFormat, Rgb, RgbImage};
use tower::ServiceExt;

use goingon::{
    create_router, AppState, CredentialVerifier, ImageCodec, MemoryBlobStore, MemoryNewsStorage,
    MemoryUserStorage, NewsImageRepository, RouterConfig,
};

pub const BASE: &str = "http://localhost:3000";
pub const CITY: &str = "Malaga";
pub const DATE: &str = "2015-05-21";

// =============================================================================
// App Setup
// =============================================================================

/// A router over empty in-memory storage.
pub struct TestApp {
    router: Router,
    pub blobs: Arc<MemoryBlobStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Same as [`TestApp::new`] but credentials are checked by `verifier`.
    pub fn with_credential_verifier(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self::build(Some(verifier))
    }

    fn build(verifier: Option<Arc<dyn CredentialVerifier>>) -> Self {
        let blobs = Arc::new(MemoryBlobStore::new());
        let images = NewsImageRepository::new(blobs.clone(), ImageCodec::default());
        let mut state = AppState::new(
            Arc::new(MemoryUserStorage::new()),
            Arc::new(MemoryNewsStorage::new()),
            images,
        );
        if let Some(verifier) = verifier {
            state = state.with_credential_verifier(verifier);
        }
        let router = create_router(state, RouterConfig::new().with_tracing(false));
        Self { router, blobs }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Register a user with a valid profile and return the response status.
    pub async fn register(&self, nickname: &str, password: &str) -> StatusCode {
        let body = serde_json::json!({
            "nickname": nickname,
            "password": password,
            "city": CITY,
            "name": "Test User",
            "email": format!("{}@example.com", nickname),
            "birth_date": "1990-01-01",
        });
        self.send(json_request(Method::POST, "/api/user", None, &body))
            .await
            .status()
    }

    /// Post a news item and return the path from its `Location` header.
    pub async fn post_news(&self, author: (&str, &str), title: &str) -> String {
        let body = serde_json::json!({ "title": title, "content": "Some content" });
        let response = self
            .send(json_request(
                Method::POST,
                &diary_path(CITY, DATE),
                Some(author),
                &body,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        location_path(&response)
    }
}

// =============================================================================
// Request Builders
// =============================================================================

pub fn basic_auth(nickname: &str, password: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", nickname, password))
    )
}

pub fn request(method: Method, uri: &str, auth: Option<(&str, &str)>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((nickname, password)) = auth {
        builder = builder.header(header::AUTHORIZATION, basic_auth(nickname, password));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(
    method: Method,
    uri: &str,
    auth: Option<(&str, &str)>,
    body: &serde_json::Value,
) -> Request<Body> {
    raw_request(method, uri, auth, "application/json", body.to_string())
}

pub fn raw_request(
    method: Method,
    uri: &str,
    auth: Option<(&str, &str)>,
    content_type: &str,
    body: impl Into<Body>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type);
    if let Some((nickname, password)) = auth {
        builder = builder.header(header::AUTHORIZATION, basic_auth(nickname, password));
    }
    builder.body(body.into()).unwrap()
}

pub fn diary_path(city: &str, date: &str) -> String {
    format!("/api/city/{}/date/{}/news", city, date)
}

// =============================================================================
// Response Helpers
// =============================================================================

pub async fn body_bytes(response: Response<Body>) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = body_bytes(response).await;
    serde_json::from_slice(&body).unwrap()
}

/// The `Location` header with the base URL stripped off.
pub fn location_path(response: &Response<Body>) -> String {
    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("Location header")
        .to_str()
        .unwrap();
    assert!(location.starts_with(BASE), "unexpected location {}", location);
    location[BASE.len()..].to_string()
}

// =============================================================================
// Images
// =============================================================================

/// A gradient image, so it is not trivially compressible.
pub fn sample_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

pub fn encode(image: &RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut data = Vec::new();
    image.write_to(&mut Cursor::new(&mut data), format).unwrap();
    data
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&sample_image(width, height), ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&sample_image(width, height), ImageFormat::Jpeg)
}
