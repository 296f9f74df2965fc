use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::config::{is_usable_api_key, Config};
use crate::error::{Error, Result};
use crate::models::{Genre, GenreList, MovieDetails, MoviePage};
use crate::services::cache::{ResponseCache, GENRE_TTL, LISTING_TTL};

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

pub const TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Returned in place of an image URL when a movie has no artwork
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-movie.svg";

/// Read side of the movie catalog used by the browse coordinator
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn trending(&self, page: u32) -> Result<MoviePage>;

    async fn search(&self, query: &str, page: u32) -> Result<MoviePage>;

    async fn discover(
        &self,
        page: u32,
        genre_id: Option<i32>,
        min_rating: Option<f64>,
    ) -> Result<MoviePage>;

    async fn movie_details(&self, id: i64) -> Result<MovieDetails>;

    async fn genres(&self) -> Result<Vec<Genre>>;
}

pub struct TmdbService {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    language: Option<String>,
    cache: ResponseCache,
}

impl TmdbService {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: TMDB_BASE_URL.to_string(),
            api_key,
            language: None,
            cache: ResponseCache::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut service = Self::new(config.tmdb_api_key.clone().unwrap_or_default());
        service.language = config.tmdb_language.clone();
        service
    }

    /// Point the client at another TMDB-compatible host (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        is_usable_api_key(&self.api_key)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Image URL for a poster/backdrop path at the given size variant
    pub fn image_url(path: Option<&str>, size: &str) -> String {
        match path {
            Some(p) if !p.is_empty() => format!("{}/{}{}", TMDB_IMAGE_BASE_URL, size, p),
            _ => PLACEHOLDER_IMAGE.to_string(),
        }
    }

    pub fn poster_url(path: Option<&str>) -> String {
        Self::image_url(path, "w500")
    }

    pub fn backdrop_url(path: Option<&str>) -> String {
        Self::image_url(path, "w1280")
    }

    /// Endpoint path plus query string, without the credential
    fn request_path(&self, endpoint: &str, params: &[(&str, String)]) -> String {
        let mut query: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();

        if let Some(lang) = &self.language {
            query.push(format!("language={}", urlencoding::encode(lang)));
        }

        if query.is_empty() {
            endpoint.to_string()
        } else {
            format!("{}?{}", endpoint, query.join("&"))
        }
    }

    /// GET a listing endpoint; every non-success status is `RemoteUnavailable`
    async fn get_json<T: DeserializeOwned>(&self, path: String, ttl: Duration) -> Result<T> {
        self.fetch(path, ttl, false).await
    }

    /// With `missing_is_not_found`, HTTP 404 becomes `Error::NotFound`
    async fn fetch<T: DeserializeOwned>(
        &self,
        path: String,
        ttl: Duration,
        missing_is_not_found: bool,
    ) -> Result<T> {
        if !self.is_configured() {
            return Err(Error::Configuration(
                "TMDB API key is not set. Add TMDB_API_KEY to your environment".into(),
            ));
        }

        if let Some(body) = self.cache.get(&path) {
            debug!("TMDB cache hit: {}", path);
            return decode(&body);
        }

        let separator = if path.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{}{}api_key={}",
            self.base_url,
            path,
            separator,
            urlencoding::encode(&self.api_key)
        );

        debug!("TMDB request: {}", path);

        let response = self.client.get(&url).send().await?;

        if missing_is_not_found && response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound);
        }

        if !response.status().is_success() {
            return Err(Error::RemoteUnavailable(format!(
                "TMDB API error: {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let value = decode(&body)?;
        self.cache.insert(path, body, ttl);
        Ok(value)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| Error::RemoteUnavailable(format!("Invalid TMDB response: {}", e)))
}

#[async_trait]
impl CatalogSource for TmdbService {
    async fn trending(&self, page: u32) -> Result<MoviePage> {
        let path = self.request_path("/trending/movie/week", &[("page", page.to_string())]);
        self.get_json(path, LISTING_TTL).await
    }

    async fn search(&self, query: &str, page: u32) -> Result<MoviePage> {
        let path = self.request_path(
            "/search/movie",
            &[("query", query.to_string()), ("page", page.to_string())],
        );
        self.get_json(path, LISTING_TTL).await
    }

    async fn discover(
        &self,
        page: u32,
        genre_id: Option<i32>,
        min_rating: Option<f64>,
    ) -> Result<MoviePage> {
        let mut params = vec![
            ("page", page.to_string()),
            ("sort_by", "popularity.desc".to_string()),
        ];
        if let Some(genre) = genre_id {
            params.push(("with_genres", genre.to_string()));
        }
        if let Some(rating) = min_rating {
            params.push(("vote_average.gte", rating.to_string()));
        }

        let path = self.request_path("/discover/movie", &params);
        self.get_json(path, LISTING_TTL).await
    }

    async fn movie_details(&self, id: i64) -> Result<MovieDetails> {
        let path = self.request_path(&format!("/movie/{}", id), &[]);
        self.fetch(path, LISTING_TTL, true).await
    }

    async fn genres(&self) -> Result<Vec<Genre>> {
        let path = self.request_path("/genre/movie/list", &[]);
        let list: GenreList = self.get_json(path, GENRE_TTL).await?;
        Ok(list.genres)
    }
}
