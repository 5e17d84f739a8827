//! News endpoint tests: CRUD, ownership, listing, hot news and votes.

use axum::http::{Method, StatusCode};

use super::test_utils::{
    body_json, diary_path, json_request, raw_request, request, TestApp, CITY, DATE,
};

const ALICE: (&str, &str) = ("alice", "a");
const BOB: (&str, &str) = ("bob", "b");

async fn app_with_users() -> TestApp {
    let app = TestApp::new();
    assert_eq!(app.register(ALICE.0, ALICE.1).await, StatusCode::CREATED);
    assert_eq!(app.register(BOB.0, BOB.1).await, StatusCode::CREATED);
    app
}

fn news_body(title: &str, content: &str) -> serde_json::Value {
    serde_json::json!({ "title": title, "content": content })
}

async fn vote(app: &TestApp, path: &str, value: serde_json::Value) -> StatusCode {
    app.send(json_request(
        Method::POST,
        &format!("{}/vote", path),
        Some(BOB),
        &serde_json::json!({ "value": value }),
    ))
    .await
    .status()
}

// =============================================================================
// Create and Read
// =============================================================================

#[tokio::test]
async fn test_post_then_get_round_trip() {
    let app = app_with_users().await;
    let path = app.post_news(ALICE, "Fair opens").await;
    assert!(path.starts_with(&format!("/api/city/{}/date/{}/news/", CITY, DATE)));

    // Reading news is public
    let response = app.send(request(Method::GET, &path, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let news = body_json(response).await;
    assert_eq!(news["title"], "Fair opens");
    assert_eq!(news["content"], "Some content");
    assert_eq!(news["author"], "alice");
    assert_eq!(news["city"], CITY);
    assert_eq!(news["date"], DATE);
    assert_eq!(news["rating"], 0);

    let rels: Vec<&str> = news["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["rel"].as_str().unwrap())
        .collect();
    assert!(rels.contains(&"self"));
    assert!(rels.contains(&"author"));
    assert_eq!(
        news["links"][0]["href"],
        format!("http://localhost:3000{}", path)
    );
}

#[tokio::test]
async fn test_post_requires_authentication() {
    let app = app_with_users().await;
    let response = app
        .send(json_request(
            Method::POST,
            &diary_path(CITY, DATE),
            None,
            &news_body("t", "c"),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_post_duplicate_rejected() {
    let app = app_with_users().await;
    app.post_news(ALICE, "Same title").await;

    let response = app
        .send(json_request(
            Method::POST,
            &diary_path(CITY, DATE),
            Some(ALICE),
            &news_body("Same title", "different content"),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "The news is already created"
    );

    // Another author may use the same title
    app.post_news(BOB, "Same title").await;
}

#[tokio::test]
async fn test_post_invalid_parameters() {
    let app = app_with_users().await;

    let cases = [
        (diary_path("Atlantis", DATE), news_body("t", "c"), "'Atlantis' is not a valid city."),
        (diary_path(CITY, "2015-13-01"), news_body("t", "c"), "'2015-13-01' is not a valid date."),
        (diary_path(CITY, "21-05-2015"), news_body("t", "c"), "'21-05-2015' is not a valid date."),
        (diary_path(CITY, DATE), news_body("", "c"), "The news format is incorrect"),
        (diary_path(CITY, DATE), serde_json::json!({ "title": "t" }), "The news format is incorrect"),
    ];

    for (uri, body, message) in cases {
        let response = app
            .send(json_request(Method::POST, &uri, Some(ALICE), &body))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {}", uri);
        assert_eq!(body_json(response).await["message"], message);
    }
}

#[tokio::test]
async fn test_get_news_errors() {
    let app = app_with_users().await;

    let response = app
        .send(request(
            Method::GET,
            &format!("{}/not-a-uuid", diary_path(CITY, DATE)),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "'not-a-uuid' is not a valid identifier for news."
    );

    let response = app
        .send(request(
            Method::GET,
            &format!("{}/{}", diary_path(CITY, DATE), uuid::Uuid::new_v4()),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["message"],
        "The news is not in the database"
    );
}

#[tokio::test]
async fn test_news_is_scoped_to_diary_entry() {
    let app = app_with_users().await;
    let path = app.post_news(ALICE, "Local").await;
    let id = path.rsplit('/').next().unwrap();

    let elsewhere = format!("{}/{}", diary_path("Sevilla", DATE), id);
    let response = app.send(request(Method::GET, &elsewhere, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Update and Delete
// =============================================================================

#[tokio::test]
async fn test_update_by_author() {
    let app = app_with_users().await;
    let path = app.post_news(ALICE, "Draft").await;

    let response = app
        .send(json_request(
            Method::PATCH,
            &path,
            Some(ALICE),
            &news_body("Final", "Edited"),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let news = body_json(app.send(request(Method::GET, &path, None)).await).await;
    assert_eq!(news["title"], "Final");
    assert_eq!(news["content"], "Edited");
    assert_eq!(news["author"], "alice");
}

#[tokio::test]
async fn test_update_by_non_author_leaves_news_unchanged() {
    let app = app_with_users().await;
    let path = app.post_news(ALICE, "Original").await;

    let response = app
        .send(json_request(
            Method::PATCH,
            &path,
            Some(BOB),
            &news_body("Hijacked", "x"),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["message"],
        "The user bob is not authorized to update this news"
    );

    let news = body_json(app.send(request(Method::GET, &path, None)).await).await;
    assert_eq!(news["title"], "Original");
}

#[tokio::test]
async fn test_update_check_order() {
    let app = app_with_users().await;
    let missing = format!("{}/{}", diary_path(CITY, DATE), uuid::Uuid::new_v4());

    // Malformed body is reported before the missing news
    let response = app
        .send(json_request(
            Method::PATCH,
            &missing,
            Some(ALICE),
            &serde_json::json!({}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing news is reported before ownership
    let response = app
        .send(json_request(
            Method::PATCH,
            &missing,
            Some(BOB),
            &news_body("t", "c"),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_by_author_and_non_author() {
    let app = app_with_users().await;
    let path = app.post_news(ALICE, "Short lived").await;

    let response = app.send(request(Method::DELETE, &path, Some(BOB))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = app.send(request(Method::GET, &path, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.send(request(Method::DELETE, &path, Some(ALICE))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.send(request(Method::GET, &path, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.send(request(Method::DELETE, &path, Some(ALICE))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_diary_entry() {
    let app = app_with_users().await;

    let response = app
        .send(request(Method::GET, &diary_path(CITY, DATE), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));

    app.post_news(BOB, "Zoo").await;
    app.post_news(ALICE, "Beach").await;
    app.post_news(ALICE, "Market").await;

    let list = body_json(
        app.send(request(Method::GET, &diary_path(CITY, DATE), None))
            .await,
    )
    .await;
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Beach", "Market", "Zoo"]);

    let other = body_json(
        app.send(request(Method::GET, &diary_path("Cadiz", DATE), None))
            .await,
    )
    .await;
    assert_eq!(other, serde_json::json!([]));
}

// =============================================================================
// Votes and Hot News
// =============================================================================

#[tokio::test]
async fn test_vote_accumulates_rating() {
    let app = app_with_users().await;
    let path = app.post_news(ALICE, "Votable").await;

    assert_eq!(vote(&app, &path, 5.into()).await, StatusCode::NO_CONTENT);
    assert_eq!(vote(&app, &path, 2.into()).await, StatusCode::NO_CONTENT);

    let news = body_json(app.send(request(Method::GET, &path, None)).await).await;
    assert_eq!(news["rating"], 7);
}

#[tokio::test]
async fn test_vote_out_of_range_rejected() {
    let app = app_with_users().await;
    let path = app.post_news(ALICE, "Votable").await;

    for value in [serde_json::json!(0), serde_json::json!(6), serde_json::json!("3")] {
        assert_eq!(
            vote(&app, &path, value).await,
            StatusCode::BAD_REQUEST
        );
    }

    let news = body_json(app.send(request(Method::GET, &path, None)).await).await;
    assert_eq!(news["rating"], 0);
}

#[tokio::test]
async fn test_vote_requires_authentication() {
    let app = app_with_users().await;
    let path = app.post_news(ALICE, "Votable").await;

    let response = app
        .send(raw_request(
            Method::POST,
            &format!("{}/vote", path),
            None,
            "application/json",
            r#"{"value":3}"#,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_vote_on_missing_news() {
    let app = app_with_users().await;
    let missing = format!("{}/{}", diary_path(CITY, DATE), uuid::Uuid::new_v4());
    assert_eq!(vote(&app, &missing, 3.into()).await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_hot_news_ordered_by_rating() {
    let app = app_with_users().await;
    let hot = format!("/api/city/{}/date/{}/hotnews", CITY, DATE);

    let response = app.send(request(Method::GET, &hot, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let low = app.post_news(ALICE, "Low").await;
    let high = app.post_news(ALICE, "High").await;
    app.post_news(BOB, "None").await;

    vote(&app, &low, 1.into()).await;
    vote(&app, &high, 5.into()).await;
    vote(&app, &high, 4.into()).await;

    let response = app.send(request(Method::GET, &hot, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let list = body_json(response).await;
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["High", "Low", "None"]);
    assert_eq!(list[0]["rating"], 9);
}

#[tokio::test]
async fn test_hot_news_is_capped() {
    let app = app_with_users().await;
    for i in 0..(goingon::server::handlers::HOT_NEWS_LIMIT + 3) {
        app.post_news(ALICE, &format!("News {:02}", i)).await;
    }

    let list = body_json(
        app.send(request(
            Method::GET,
            &format!("/api/city/{}/date/{}/hotnews", CITY, DATE),
            None,
        ))
        .await,
    )
    .await;
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles.len(), goingon::server::handlers::HOT_NEWS_LIMIT);

    // equal ratings fall back to title order
    assert_eq!(titles[0], "News 00");
    assert_eq!(titles[9], "News 09");
}
