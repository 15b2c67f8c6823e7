//! Integration tests for songbook-catalog API endpoints
//!
//! Each test runs the router against an in-memory database, with song
//! creation enriched by a songbook-info instance on an ephemeral port.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use songbook_catalog::lookup::HttpLyricsLookup;
use songbook_catalog::{build_router, AppState};
use songbook_common::config::LookupConfig;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: single-connection in-memory database with schema applied
async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database");
    songbook_common::db::run_migrations(&pool)
        .await
        .expect("Should run migrations");
    pool
}

/// Test helper: serve songbook-info on an ephemeral port, return its base URL
async fn spawn_info_service() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, songbook_info::build_router())
            .await
            .unwrap();
    });
    format!("http://{}", addr)
}

fn setup_app_with_lookup(db: SqlitePool, base_url: String) -> Router {
    let lookup = HttpLyricsLookup::new(&LookupConfig {
        base_url,
        timeout_secs: 5,
    })
    .expect("Should build lookup client");
    build_router(AppState::with_pool(db, Arc::new(lookup)))
}

async fn setup_app(db: SqlitePool) -> Router {
    let base_url = spawn_info_service().await;
    setup_app_with_lookup(db, base_url)
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Create a song through the API and return its id
async fn create(app: &Router, group: &str, song: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/songs",
            json!({"group": group, "song": song}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = extract_json(response.into_body()).await;
    body["data"].as_i64().expect("id in data field")
}

async fn song_count(db: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(db)
        .await
        .unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(setup_test_db().await).await;

    let response = app
        .oneshot(test_request("GET", "/api/health-check"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "songbook-catalog");
    assert!(body["version"].is_string());
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_enriches_and_persists() {
    let app = setup_app(setup_test_db().await).await;

    let id = create(&app, "Muse", "Supermassive Black Hole").await;

    let response = app
        .oneshot(test_request("GET", &format!("/api/songs/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let song = &body["data"];
    assert_eq!(song["id"], id);
    assert_eq!(song["group"], "Muse");
    assert_eq!(song["song"], "Supermassive Black Hole");
    assert_eq!(song["release_date"], "2006-07-16");
    assert_eq!(song["link"], "https://example.com");
    assert_eq!(song["lyrics"].as_array().unwrap().len(), 2);
    assert!(song["lyrics"][1].as_str().unwrap().starts_with("Ooh\n"));
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_create_ignores_client_supplied_content() {
    let app = setup_app(setup_test_db().await).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/songs",
            json!({
                "group": "Muse",
                "song": "Uprising",
                "release_date": "1999-01-01",
                "lyrics": ["client verse"],
                "link": "https://client.example"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = extract_json(response.into_body()).await["data"].clone();

    let response = app
        .oneshot(test_request("GET", &format!("/api/songs/{}", id)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["release_date"], "2006-07-16");
    assert_eq!(body["data"]["link"], "https://example.com");
}

#[tokio::test]
async fn test_create_duplicate_conflict() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone()).await;

    create(&app, "Muse", "Uprising").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/songs",
            json!({"group": "Muse", "song": "Uprising"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert_eq!(song_count(&db).await, 1);
}

#[tokio::test]
async fn test_create_requires_group_and_song() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone()).await;

    for body in [json!({"song": "Uprising"}), json!({"group": "Muse", "song": ""})] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/songs", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = extract_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }
    assert_eq!(song_count(&db).await, 0);
}

#[tokio::test]
async fn test_create_malformed_body() {
    let app = setup_app(setup_test_db().await).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/songs")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_create_lookup_unreachable() {
    let db = setup_test_db().await;

    // Nothing listens on a port that was bound and released
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let app = setup_app_with_lookup(db.clone(), base_url);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/songs",
            json!({"group": "Muse", "song": "Uprising"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_GATEWAY");
    assert_eq!(song_count(&db).await, 0);
}

// =============================================================================
// Get
// =============================================================================

#[tokio::test]
async fn test_get_song_verse_pagination() {
    let app = setup_app(setup_test_db().await).await;
    let id = create(&app, "Muse", "Uprising").await;

    let response = app
        .clone()
        .oneshot(test_request("GET", &format!("/api/songs/{}?page=1&size=1", id)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["lyrics"].as_array().unwrap().len(), 1);
    assert!(body["data"]["lyrics"][0]
        .as_str()
        .unwrap()
        .starts_with("Ooh baby"));
    assert_eq!(body["count"], 2);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["current_page"], 1);
    assert_eq!(body["has_next_page"], true);

    let response = app
        .oneshot(test_request("GET", &format!("/api/songs/{}?page=3&size=1", id)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["lyrics"], json!([]));
    assert_eq!(body["has_next_page"], false);
}

#[tokio::test]
async fn test_get_song_not_found() {
    let app = setup_app(setup_test_db().await).await;

    let response = app
        .oneshot(test_request("GET", "/api/songs/404"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_non_integer_id_rejected() {
    let app = setup_app(setup_test_db().await).await;

    for method in ["GET", "DELETE"] {
        let response = app
            .clone()
            .oneshot(test_request(method, "/api/songs/abc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", method);
    }
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn test_list_filters_and_pagination() {
    let app = setup_app(setup_test_db().await).await;
    create(&app, "Muse", "Uprising").await;
    create(&app, "Muse", "Madness").await;
    create(&app, "Radiohead", "Creep").await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/songs?group=MUSE&size=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["has_next_page"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["song"], "Uprising");

    let response = app
        .oneshot(test_request("GET", "/api/songs?song=creep&release_date=2006-07-16"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["group"], "Radiohead");
}

#[tokio::test]
async fn test_list_group_filter_folds_cyrillic() {
    let app = setup_app(setup_test_db().await).await;
    create(&app, "Кино", "Группа крови").await;
    create(&app, "Muse", "Uprising").await;

    // group=КИНО
    let response = app
        .oneshot(test_request("GET", "/api/songs?group=%D0%9A%D0%98%D0%9D%D0%9E"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["group"], "Кино");
}

#[tokio::test]
async fn test_list_invalid_page_params_use_defaults() {
    let app = setup_app(setup_test_db().await).await;
    create(&app, "Muse", "Uprising").await;

    let response = app
        .oneshot(test_request("GET", "/api/songs?page=first&size=-3&unknown=x"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["current_page"], 1);
    assert_eq!(body["count"], 1);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["has_next_page"], false);
}

#[tokio::test]
async fn test_list_empty() {
    let app = setup_app(setup_test_db().await).await;

    let response = app
        .oneshot(test_request("GET", "/api/songs"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["count"], 0);
    assert_eq!(body["total_pages"], 0);
}

// =============================================================================
// Update / Delete
// =============================================================================

#[tokio::test]
async fn test_update_song() {
    let app = setup_app(setup_test_db().await).await;
    let id = create(&app, "Muse", "Uprising").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/songs/{}", id),
            json!({
                "group": "Muse",
                "song": "Uprising",
                "release_date": "2009-09-07",
                "lyrics": ["The paranoia is in bloom", "They will not force us"],
                "link": "https://example.com/uprising"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response.into_body()).await, json!({"data": "OK"}));

    let response = app
        .oneshot(test_request("GET", &format!("/api/songs/{}", id)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["release_date"], "2009-09-07");
    assert_eq!(body["data"]["lyrics"][1], "They will not force us");
    assert_eq!(body["data"]["link"], "https://example.com/uprising");
}

#[tokio::test]
async fn test_update_requires_full_body() {
    let app = setup_app(setup_test_db().await).await;
    let id = create(&app, "Muse", "Uprising").await;

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/songs/{}", id),
            json!({"group": "Muse", "song": "Uprising"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_missing_song() {
    let app = setup_app(setup_test_db().await).await;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/songs/77",
            json!({
                "group": "Muse",
                "song": "Uprising",
                "release_date": "2009-09-07",
                "lyrics": [],
                "link": ""
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_song() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone()).await;
    let id = create(&app, "Muse", "Uprising").await;

    let response = app
        .clone()
        .oneshot(test_request("DELETE", &format!("/api/songs/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(song_count(&db).await, 0);

    let response = app
        .oneshot(test_request("DELETE", &format!("/api/songs/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
