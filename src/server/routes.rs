//! Router configuration for GoingOn.
//!
//! This module defines the HTTP routes and applies the body limit, CORS and
//! tracing layers. Authentication is not a layer: protected handlers take an
//! [`AuthenticatedUser`](super::auth::AuthenticatedUser) argument, which lets
//! public and protected methods share a path.
//!
//! # Route Structure
//!
//! ```text
//! /health                                                   GET
//! /api/user                                                 POST
//! /api/user/{nickname}                                      GET* PATCH* DELETE*
//! /api/city/{city}/date/{date}/news                         GET  POST*
//! /api/city/{city}/date/{date}/hotnews                      GET
//! /api/city/{city}/date/{date}/news/{news_id}               GET  PATCH* DELETE*
//! /api/city/{city}/date/{date}/news/{news_id}/vote          POST*
//! /api/city/{city}/date/{date}/news/{news_id}/image         GET  POST* DELETE*
//! /api/city/{city}/date/{date}/news/{news_id}/image/thumbnail GET
//!
//! * requires HTTP Basic authentication
//! ```
//!
//! # Example
//!
//! ```ignore
//! let state = AppState::new(users, news, NewsImageRepository::new(blobs, ImageCodec::default()));
//! let router = create_router(state, RouterConfig::new());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use http::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_news_handler, create_news_image_handler, create_user_handler, delete_news_handler,
    delete_news_image_handler, delete_user_handler, get_news_handler, get_news_image_handler,
    get_news_thumbnail_handler, get_user_handler, health_handler, hot_news_handler,
    list_news_handler, update_news_handler, update_user_handler, vote_news_handler, AppState,
};

/// Default request body limit (10 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Maximum accepted request body in bytes
    pub max_body_size: usize,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// By default CORS allows any origin, bodies are capped at
    /// [`DEFAULT_MAX_BODY_SIZE`] and tracing is enabled.
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// # Arguments
///
/// * `state` - Storage handles and credential verifier shared by all handlers
/// * `config` - Router configuration
///
/// # Returns
///
/// A configured Axum router ready to be served.
pub fn create_router(state: AppState, config: RouterConfig) -> Router {
    let news_item = "/api/city/{city}/date/{date}/news/{news_id}";

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/api/user", post(create_user_handler))
        .route(
            "/api/user/{nickname}",
            get(get_user_handler)
                .patch(update_user_handler)
                .delete(delete_user_handler),
        )
        .route(
            "/api/city/{city}/date/{date}/news",
            get(list_news_handler).post(create_news_handler),
        )
        .route("/api/city/{city}/date/{date}/hotnews", get(hot_news_handler))
        .route(
            news_item,
            get(get_news_handler)
                .patch(update_news_handler)
                .delete(delete_news_handler),
        )
        .route(&format!("{}/vote", news_item), post(vote_news_handler))
        .route(
            &format!("{}/image", news_item),
            get(get_news_image_handler)
                .post(create_news_image_handler)
                .delete(delete_news_image_handler),
        )
        .route(
            &format!("{}/image/thumbnail", news_item),
            get(get_news_thumbnail_handler),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(build_cors_layer(&config));

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers([LOCATION])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
