//! HTTP Basic authentication tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use goingon::server::{Credentials, Principal};
use goingon::{CredentialVerifier, StorageError};

use super::test_utils::{body_json, diary_path, json_request, request, TestApp, CITY, DATE};

async fn app_with_alice() -> TestApp {
    let app = TestApp::new();
    assert_eq!(app.register("alice", "s3cret").await, StatusCode::CREATED);
    app
}

fn with_authorization(uri: &str, value: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::AUTHORIZATION, value)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint_public() {
    let app = TestApp::new();
    let response = app.send(request(Method::GET, "/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
}

#[tokio::test]
async fn test_valid_credentials_succeed() {
    let app = app_with_alice().await;
    let response = app
        .send(request(Method::GET, "/api/user/alice", Some(("alice", "s3cret"))))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_credentials_challenge() {
    let app = app_with_alice().await;
    let response = app.send(request(Method::GET, "/api/user/alice", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Basic realm=\"GoingOn\""
    );

    let error = body_json(response).await;
    assert_eq!(error["error"], "missing_credentials");
    assert_eq!(error["status"], 401);
}

#[tokio::test]
async fn test_wrong_password_rejected() {
    let app = app_with_alice().await;
    let response = app
        .send(request(Method::GET, "/api/user/alice", Some(("alice", "guess"))))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    assert_eq!(body_json(response).await["error"], "invalid_credentials");
}

#[tokio::test]
async fn test_unknown_user_rejected() {
    let app = app_with_alice().await;
    let response = app
        .send(request(Method::GET, "/api/user/alice", Some(("mallory", "s3cret"))))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "invalid_credentials");
}

#[tokio::test]
async fn test_malformed_headers_rejected() {
    let app = app_with_alice().await;

    for value in [
        "Bearer abc",
        "Basic !!!not-base64!!!",
        "Basic YWxpY2U=", // "alice" without a colon
        "Basic",
    ] {
        let response = app.send(with_authorization("/api/user/alice", value)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "header: {}", value);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }
}

#[tokio::test]
async fn test_password_may_contain_colon() {
    let app = TestApp::new();
    assert_eq!(app.register("carol", "a:b:c").await, StatusCode::CREATED);

    let response = app
        .send(request(Method::GET, "/api/user/carol", Some(("carol", "a:b:c"))))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_public_reads_ignore_credentials() {
    let app = app_with_alice().await;
    let uri = "/api/city/Malaga/date/2015-05-21/news";

    let response = app.send(request(Method::GET, uri, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Even bad credentials do not block a public read
    let response = app
        .send(request(Method::GET, uri, Some(("alice", "wrong"))))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_authentication_precedes_validation() {
    let app = app_with_alice().await;

    // Invalid city, but no credentials: authentication fails first
    let response = app
        .send(request(
            Method::POST,
            "/api/city/Atlantis/date/2015-05-21/news",
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Accepts a single fixed account that has no user record.
struct FixedAccountVerifier;

#[async_trait]
impl CredentialVerifier for FixedAccountVerifier {
    async fn verify(&self, credentials: &Credentials) -> Result<Option<Principal>, StorageError> {
        if credentials.nickname == "carol" && credentials.password == "token" {
            Ok(Some(Principal {
                nickname: credentials.nickname.clone(),
            }))
        } else {
            Ok(None)
        }
    }
}

#[tokio::test]
async fn test_custom_credential_verifier_replaces_user_storage() {
    let app = TestApp::with_credential_verifier(Arc::new(FixedAccountVerifier));
    assert_eq!(app.register("alice", "s3cret").await, StatusCode::CREATED);

    // carol is unknown to user storage but accepted by the verifier
    let body = serde_json::json!({ "title": "Feria", "content": "Opening night" });
    let response = app
        .send(json_request(
            Method::POST,
            &diary_path(CITY, DATE),
            Some(("carol", "token")),
            &body,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // alice is in user storage but the verifier does not know her
    let response = app
        .send(json_request(
            Method::POST,
            &diary_path(CITY, DATE),
            Some(("alice", "s3cret")),
            &body,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
}
