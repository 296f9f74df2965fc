use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SearchInput {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct GenreInput {
    pub genre_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RatingInput {
    pub min_rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct FavoritesViewInput {
    pub active: bool,
}

pub async fn get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(json!(state.coordinator.snapshot())))
}

pub async fn refresh(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    state.coordinator.refresh().await?;
    Ok((StatusCode::OK, Json(json!(state.coordinator.snapshot()))))
}

pub async fn set_search(
    State(state): State<Arc<AppState>>,
    Json(input): Json<SearchInput>,
) -> ApiResult<impl IntoResponse> {
    state.coordinator.set_search_query(&input.query).await?;
    Ok((StatusCode::OK, Json(json!(state.coordinator.snapshot()))))
}

pub async fn set_genre(
    State(state): State<Arc<AppState>>,
    Json(input): Json<GenreInput>,
) -> ApiResult<impl IntoResponse> {
    state.coordinator.set_genre_filter(input.genre_id).await?;
    Ok((StatusCode::OK, Json(json!(state.coordinator.snapshot()))))
}

pub async fn set_rating(
    State(state): State<Arc<AppState>>,
    Json(input): Json<RatingInput>,
) -> ApiResult<impl IntoResponse> {
    state.coordinator.set_rating_filter(input.min_rating).await?;
    Ok((StatusCode::OK, Json(json!(state.coordinator.snapshot()))))
}

pub async fn clear_filters(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    state.coordinator.clear_filters().await?;
    Ok((StatusCode::OK, Json(json!(state.coordinator.snapshot()))))
}

pub async fn set_favorites_view(
    State(state): State<Arc<AppState>>,
    Json(input): Json<FavoritesViewInput>,
) -> impl IntoResponse {
    state.coordinator.set_favorites_view(input.active);
    (StatusCode::OK, Json(json!(state.coordinator.snapshot())))
}

/// Infinite-scroll trigger; `loaded` is false when the request was dropped
pub async fn next_page(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let loaded = state.coordinator.request_next_page().await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "loaded": loaded, "state": state.coordinator.snapshot() })),
    ))
}
