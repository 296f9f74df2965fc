use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};

use movie_explorer_core::{
    Config,
    services::FavoritesStore,
    test_helpers::{CatalogCall, FakeCatalog, SEARCH_BASE, TRENDING_BASE, fixtures},
};
use movie_explorer_server::{AppState, create_app_state, create_router};

fn setup() -> (TestServer, Arc<FakeCatalog>) {
    let catalog = Arc::new(FakeCatalog::default());
    let state = Arc::new(AppState::new(
        catalog.clone(),
        FavoritesStore::in_memory(),
        true,
    ));
    let server = TestServer::new(create_router(state, None)).unwrap();
    (server, catalog)
}

fn item_ids(state: &Value) -> Vec<i64> {
    state["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let (server, _) = setup();
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_status() {
    let (server, _) = setup();
    let body: Value = server.get("/api/v1/status").await.json();
    assert_eq!(body["api_key_configured"], true);
    assert_eq!(body["favorites_available"], true);
}

#[tokio::test]
async fn test_status_without_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        tmdb_api_key: None,
        data_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    let server = TestServer::new(create_router(create_app_state(&config), None)).unwrap();

    let body: Value = server.get("/api/v1/status").await.json();
    assert_eq!(body["api_key_configured"], false);

    // Catalog calls fail fast without touching the network
    server
        .get("/api/v1/genres")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_initial_state_is_empty_trending() {
    let (server, _) = setup();
    let body: Value = server.get("/api/v1/browse").await.json();
    assert_eq!(body["mode"]["kind"], "trending");
    assert_eq!(body["page"], 1);
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn test_refresh_and_infinite_scroll() {
    let (server, catalog) = setup();

    let body: Value = server.post("/api/v1/browse/refresh").await.json();
    assert_eq!(item_ids(&body), catalog.ids_for(TRENDING_BASE, 1));
    assert_eq!(body["has_more"], true);

    let body: Value = server.post("/api/v1/browse/next").await.json();
    assert_eq!(body["loaded"], true);
    assert_eq!(body["state"]["page"], 2);
    assert_eq!(body["state"]["items"].as_array().unwrap().len(), 40);
}

#[tokio::test]
async fn test_search_and_fallback() {
    let (server, catalog) = setup();

    let response = server
        .put("/api/v1/browse/search")
        .json(&json!({ "query": "alien" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["mode"]["kind"], "search");
    assert_eq!(body["mode"]["query"], "alien");
    assert_eq!(item_ids(&body), catalog.ids_for(SEARCH_BASE, 1));

    let body: Value = server
        .put("/api/v1/browse/search")
        .json(&json!({ "query": "" }))
        .await
        .json();
    assert_eq!(body["mode"]["kind"], "trending");
    assert_eq!(item_ids(&body), catalog.ids_for(TRENDING_BASE, 1));
}

#[tokio::test]
async fn test_filters_and_clear() {
    let (server, catalog) = setup();

    server
        .put("/api/v1/browse/genre")
        .json(&json!({ "genre_id": 28 }))
        .await
        .assert_status_ok();
    let body: Value = server
        .put("/api/v1/browse/rating")
        .json(&json!({ "min_rating": 8.0 }))
        .await
        .json();
    assert_eq!(body["mode"]["kind"], "discover");
    assert_eq!(body["mode"]["genre_id"], 28);
    assert_eq!(body["mode"]["min_rating"], 8.0);
    assert_eq!(
        catalog.calls().last(),
        Some(&CatalogCall::Discover {
            page: 1,
            genre_id: Some(28),
            min_rating: Some(8.0)
        })
    );

    let body: Value = server.post("/api/v1/browse/clear-filters").await.json();
    assert_eq!(body["mode"]["kind"], "trending");
    assert_eq!(body["genre_id"], Value::Null);
}

#[tokio::test]
async fn test_invalid_rating_is_bad_request() {
    let (server, _) = setup();
    let response = server
        .put("/api/v1/browse/rating")
        .json(&json!({ "min_rating": 42.0 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("between 0 and 10"));
}

#[tokio::test]
async fn test_upstream_failure_is_service_unavailable() {
    let (server, catalog) = setup();
    catalog.fail(CatalogCall::Trending(1), 1);

    server
        .post("/api/v1/browse/refresh")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = server.get("/api/v1/browse").await.json();
    assert_eq!(body["loading"], false);
    assert!(body["last_error"].is_string());
}

#[tokio::test]
async fn test_favorites_view_blocks_next_page() {
    let (server, _) = setup();
    server.post("/api/v1/browse/refresh").await.assert_status_ok();

    let body: Value = server
        .put("/api/v1/browse/favorites-view")
        .json(&json!({ "active": true }))
        .await
        .json();
    assert_eq!(body["favorites_view"], true);

    let body: Value = server.post("/api/v1/browse/next").await.json();
    assert_eq!(body["loaded"], false);
    assert_eq!(body["state"]["page"], 1);
}

#[tokio::test]
async fn test_genres() {
    let (server, _) = setup();
    let body: Value = server.get("/api/v1/genres").await.json();
    assert_eq!(body[0]["name"], "Action");
}

#[tokio::test]
async fn test_movie_details() {
    let (server, _) = setup();

    let body: Value = server.get("/api/v1/movies/42").await.json();
    assert_eq!(body["id"], 42);
    assert_eq!(body["runtime_label"], "2h 3m");
    assert_eq!(body["poster_url"], "https://image.tmdb.org/t/p/w500/poster-42.jpg");
    assert_eq!(body["backdrop_url"], "/placeholder-movie.svg");
    assert_eq!(body["is_favorite"], false);

    server
        .get("/api/v1/movies/-1")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favorites_lifecycle() {
    let (server, _) = setup();
    let movie = fixtures::movie(7);

    let body: Value = server
        .post("/api/v1/favorites/toggle")
        .json(&movie)
        .await
        .json();
    assert_eq!(body["is_favorite"], true);

    let body: Value = server.get("/api/v1/favorites/7").await.json();
    assert_eq!(body["is_favorite"], true);

    let details: Value = server.get("/api/v1/movies/7").await.json();
    assert_eq!(details["is_favorite"], true);

    let body: Value = server
        .post("/api/v1/favorites/toggle")
        .json(&movie)
        .await
        .json();
    assert_eq!(body["is_favorite"], false);

    server.post("/api/v1/favorites").json(&movie).await.assert_status_ok();
    server.post("/api/v1/favorites").json(&movie).await.assert_status_ok();
    server
        .post("/api/v1/favorites")
        .json(&fixtures::movie(8))
        .await
        .assert_status_ok();

    let list: Value = server.get("/api/v1/favorites").await.json();
    assert_eq!(item_ids(&json!({ "items": list })), vec![7, 8]);

    server
        .delete("/api/v1/favorites/7")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let list: Value = server.get("/api/v1/favorites").await.json();
    assert_eq!(list.as_array().unwrap().len(), 1);

    server
        .delete("/api/v1/favorites")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let list: Value = server.get("/api/v1/favorites").await.json();
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_favorites_persist_to_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        ..Config::default()
    };

    let server = TestServer::new(create_router(create_app_state(&config), None)).unwrap();
    server
        .post("/api/v1/favorites")
        .json(&fixtures::movie(99))
        .await
        .assert_status_ok();

    // A fresh state over the same directory sees the favorite
    let server = TestServer::new(create_router(create_app_state(&config), None)).unwrap();
    let body: Value = server.get("/api/v1/favorites/99").await.json();
    assert_eq!(body["is_favorite"], true);
    assert!(dir.path().join("movie-favorites.json").exists());
}
