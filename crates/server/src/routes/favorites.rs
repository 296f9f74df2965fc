use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use movie_explorer_core::models::Movie;

use crate::AppState;

pub async fn list(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(json!(state.favorites.list())))
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    Json(movie): Json<Movie>,
) -> impl IntoResponse {
    state.favorites.add(&movie);
    let is_favorite = state.favorites.is_favorite(movie.id);
    (
        StatusCode::OK,
        Json(json!({ "id": movie.id, "is_favorite": is_favorite })),
    )
}

pub async fn toggle(
    State(state): State<Arc<AppState>>,
    Json(movie): Json<Movie>,
) -> impl IntoResponse {
    let is_favorite = state.favorites.toggle(&movie);
    (
        StatusCode::OK,
        Json(json!({ "id": movie.id, "is_favorite": is_favorite })),
    )
}

pub async fn check(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "id": id, "is_favorite": state.favorites.is_favorite(id) })),
    )
}

pub async fn remove(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> impl IntoResponse {
    state.favorites.remove(id);
    StatusCode::NO_CONTENT
}

pub async fn clear(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.favorites.clear();
    StatusCode::NO_CONTENT
}
