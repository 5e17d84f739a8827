//! Image endpoint tests: upload, re-encoding, thumbnails and deletion.

use axum::http::{header, Method, StatusCode};
use image::{GenericImageView, ImageFormat};

use super::test_utils::{
    body_bytes, body_json, jpeg_bytes, location_path, png_bytes, raw_request, request, TestApp,
};

const ALICE: (&str, &str) = ("alice", "a");
const BOB: (&str, &str) = ("bob", "b");

async fn app_with_news() -> (TestApp, String) {
    let app = TestApp::new();
    app.register(ALICE.0, ALICE.1).await;
    app.register(BOB.0, BOB.1).await;
    let path = app.post_news(ALICE, "Pictured").await;
    (app, path)
}

async fn upload(
    app: &TestApp,
    news_path: &str,
    auth: (&str, &str),
    content_type: &str,
    data: Vec<u8>,
) -> axum::http::Response<axum::body::Body> {
    app.send(raw_request(
        Method::POST,
        &format!("{}/image", news_path),
        Some(auth),
        content_type,
        data,
    ))
    .await
}

#[tokio::test]
async fn test_upload_png_then_fetch() {
    let (app, path) = app_with_news().await;

    let response = upload(&app, &path, ALICE, "image/png", png_bytes(120, 80)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let image_path = location_path(&response);
    assert_eq!(image_path, format!("{}/image", path));

    let response = app.send(request(Method::GET, &image_path, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );

    let stored = image::load_from_memory(&body_bytes(response).await).unwrap();
    assert_eq!(stored.dimensions(), (120, 80));

    // Full image and thumbnail
    assert_eq!(app.blobs.len().await, 2);
}

#[tokio::test]
async fn test_upload_jpeg_is_stored_as_png() {
    let (app, path) = app_with_news().await;

    let response = upload(&app, &path, ALICE, "image/jpeg", jpeg_bytes(64, 64)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .send(request(Method::GET, &format!("{}/image", path), None))
        .await;
    let data = body_bytes(response).await;
    assert_eq!(image::guess_format(&data).unwrap(), ImageFormat::Png);
}

#[tokio::test]
async fn test_thumbnail_fits_bounding_box() {
    let (app, path) = app_with_news().await;
    upload(&app, &path, ALICE, "image/png", png_bytes(200, 100)).await;

    let response = app
        .send(request(
            Method::GET,
            &format!("{}/image/thumbnail", path),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );

    let thumbnail = image::load_from_memory(&body_bytes(response).await).unwrap();
    let (width, height) = thumbnail.dimensions();
    assert_eq!(width, 40);
    assert!(height <= 40);
}

#[tokio::test]
async fn test_thumbnail_missing_without_image() {
    let (app, path) = app_with_news().await;

    let response = app
        .send(request(
            Method::GET,
            &format!("{}/image/thumbnail", path),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(request(Method::GET, &format!("{}/image", path), None))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["message"],
        "The image is not in the database"
    );
}

#[tokio::test]
async fn test_upload_rejects_invalid_images() {
    let (app, path) = app_with_news().await;

    let cases = [
        ("image/png", b"definitely not an image".to_vec()),
        ("image/jpeg", png_bytes(10, 10)),
        ("image/gif", png_bytes(10, 10)),
        ("text/plain", png_bytes(10, 10)),
    ];

    for (content_type, data) in cases {
        let response = upload(&app, &path, ALICE, content_type, data).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "content type {}",
            content_type
        );
    }
    assert!(app.blobs.is_empty().await);
}

#[tokio::test]
async fn test_upload_by_non_author_unauthorized() {
    let (app, path) = app_with_news().await;

    let response = upload(&app, &path, BOB, "image/png", png_bytes(10, 10)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["message"],
        "The user bob is not authorized to modify the image of this news"
    );
    assert!(app.blobs.is_empty().await);
}

#[tokio::test]
async fn test_upload_twice_rejected() {
    let (app, path) = app_with_news().await;

    let response = upload(&app, &path, ALICE, "image/png", png_bytes(10, 10)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = upload(&app, &path, ALICE, "image/png", png_bytes(20, 20)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "The image is already created"
    );
}

#[tokio::test]
async fn test_upload_to_missing_news() {
    let (app, _) = app_with_news().await;
    let missing = format!(
        "/api/city/Malaga/date/2015-05-21/news/{}",
        uuid::Uuid::new_v4()
    );

    let response = upload(&app, &missing, ALICE, "image/png", png_bytes(10, 10)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_image() {
    let (app, path) = app_with_news().await;
    upload(&app, &path, ALICE, "image/png", png_bytes(10, 10)).await;
    let image_path = format!("{}/image", path);

    let response = app
        .send(request(Method::DELETE, &image_path, Some(BOB)))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.blobs.len().await, 2);

    let response = app
        .send(request(Method::DELETE, &image_path, Some(ALICE)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(app.blobs.is_empty().await);

    let response = app
        .send(request(Method::DELETE, &image_path, Some(ALICE)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(request(
            Method::GET,
            &format!("{}/thumbnail", image_path),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_news_keeps_image_blobs() {
    let (app, path) = app_with_news().await;
    upload(&app, &path, ALICE, "image/png", png_bytes(10, 10)).await;

    let response = app.send(request(Method::DELETE, &path, Some(ALICE))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The image is unreachable through the API but not removed
    let response = app
        .send(request(Method::GET, &format!("{}/image", path), None))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.blobs.len().await, 2);
}
