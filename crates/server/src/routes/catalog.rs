use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;

use movie_explorer_core::{models::MovieDetails, services::TmdbService};

use crate::{ApiResult, AppState};

/// Detail payload for the movie overlay
#[derive(Debug, Serialize)]
pub struct MovieDetailsResponse {
    #[serde(flatten)]
    pub details: MovieDetails,
    pub poster_url: String,
    pub backdrop_url: String,
    pub runtime_label: Option<String>,
    pub is_favorite: bool,
}

pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "api_key_configured": state.api_key_configured,
            "favorites_available": state.favorites.is_available(),
        })),
    )
}

pub async fn genres(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let genres = state.catalog.genres().await?;
    Ok((StatusCode::OK, Json(json!(genres))))
}

pub async fn movie_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let details = state.catalog.movie_details(id).await?;

    let response = MovieDetailsResponse {
        poster_url: TmdbService::poster_url(details.movie.poster_path.as_deref()),
        backdrop_url: TmdbService::backdrop_url(details.movie.backdrop_path.as_deref()),
        runtime_label: details.runtime_label(),
        is_favorite: state.favorites.is_favorite(id),
        details,
    };

    Ok((StatusCode::OK, Json(json!(response))))
}
