//! Test helpers: a scripted in-process catalog and movie fixtures

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::{Error, Result};
use crate::models::{Genre, MovieDetails, MoviePage};
use crate::services::CatalogSource;

/// Every request the fake catalog has received, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogCall {
    Trending(u32),
    Search(String, u32),
    Discover {
        page: u32,
        genre_id: Option<i32>,
        min_rating: Option<f64>,
    },
    Details(i64),
    Genres,
}

impl CatalogCall {
    fn key(&self) -> String {
        format!("{:?}", self)
    }
}

/// Deterministic catalog: every listing has `total_pages` pages of
/// `page_size` movies with ids derived from the listing and page number.
pub struct FakeCatalog {
    total_pages: u32,
    page_size: usize,
    calls: Mutex<Vec<CatalogCall>>,
    overrides: Mutex<HashMap<String, MoviePage>>,
    failures: Mutex<HashMap<String, u32>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl Default for FakeCatalog {
    fn default() -> Self {
        Self::new(5, 20)
    }
}

impl FakeCatalog {
    pub fn new(total_pages: u32, page_size: usize) -> Self {
        Self {
            total_pages,
            page_size,
            calls: Mutex::new(Vec::new()),
            overrides: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    pub fn calls(&self) -> Vec<CatalogCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Replace the generated response for one request
    pub fn set_page(&self, call: CatalogCall, page: MoviePage) {
        self.overrides.lock().unwrap().insert(call.key(), page);
    }

    /// Make the next `times` matching requests fail with `RemoteUnavailable`
    pub fn fail(&self, call: CatalogCall, times: u32) {
        self.failures.lock().unwrap().insert(call.key(), times);
    }

    /// Park the matching request until the returned gate is notified
    pub fn hold(&self, call: CatalogCall) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(call.key(), gate.clone());
        gate
    }

    /// First id of a generated listing page
    pub fn first_id(listing_base: i64, page: u32, page_size: usize) -> i64 {
        listing_base + i64::from(page - 1) * page_size as i64
    }

    /// Movie ids of a generated page
    pub fn ids_for(&self, listing_base: i64, page: u32) -> Vec<i64> {
        let first = Self::first_id(listing_base, page, self.page_size);
        (0..self.page_size as i64).map(|i| first + i).collect()
    }

    async fn respond(&self, call: CatalogCall, base: i64, label: &str) -> Result<MoviePage> {
        let key = call.key();
        let page = match &call {
            CatalogCall::Trending(p) | CatalogCall::Search(_, p) => *p,
            CatalogCall::Discover { page, .. } => *page,
            _ => 1,
        };
        self.calls.lock().unwrap().push(call);

        let gate = self.gates.lock().unwrap().remove(&key);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&key)
                && *remaining > 0
            {
                *remaining -= 1;
                return Err(Error::RemoteUnavailable("scripted failure".into()));
            }
        }

        if let Some(page) = self.overrides.lock().unwrap().get(&key) {
            return Ok(page.clone());
        }

        if page > self.total_pages {
            let mut empty = MoviePage::empty(page);
            empty.total_pages = self.total_pages;
            return Ok(empty);
        }

        let first = Self::first_id(base, page, self.page_size);
        let results = (0..self.page_size as i64)
            .map(|i| fixtures::titled_movie(first + i, &format!("{} {}", label, first + i)))
            .collect();

        Ok(MoviePage {
            page,
            results,
            total_pages: self.total_pages,
            total_results: self.total_pages * self.page_size as u32,
        })
    }
}

pub const TRENDING_BASE: i64 = 1_000_000;
pub const SEARCH_BASE: i64 = 2_000_000;
pub const DISCOVER_BASE: i64 = 3_000_000;

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn trending(&self, page: u32) -> Result<MoviePage> {
        self.respond(CatalogCall::Trending(page), TRENDING_BASE, "Trending")
            .await
    }

    async fn search(&self, query: &str, page: u32) -> Result<MoviePage> {
        let label = format!("Search {}", query);
        self.respond(CatalogCall::Search(query.to_string(), page), SEARCH_BASE, &label)
            .await
    }

    async fn discover(
        &self,
        page: u32,
        genre_id: Option<i32>,
        min_rating: Option<f64>,
    ) -> Result<MoviePage> {
        let call = CatalogCall::Discover {
            page,
            genre_id,
            min_rating,
        };
        self.respond(call, DISCOVER_BASE, "Discover").await
    }

    async fn movie_details(&self, id: i64) -> Result<MovieDetails> {
        self.calls.lock().unwrap().push(CatalogCall::Details(id));
        if id < 0 {
            return Err(Error::NotFound);
        }
        Ok(fixtures::details(id))
    }

    async fn genres(&self) -> Result<Vec<Genre>> {
        self.calls.lock().unwrap().push(CatalogCall::Genres);
        Ok(vec![
            Genre {
                id: 28,
                name: "Action".into(),
            },
            Genre {
                id: 35,
                name: "Comedy".into(),
            },
        ])
    }
}

/// Test fixtures for common test data
pub mod fixtures {
    use crate::models::{Genre, Movie, MovieDetails, MoviePage};

    pub fn movie(id: i64) -> Movie {
        titled_movie(id, &format!("Movie {}", id))
    }

    pub fn titled_movie(id: i64, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            overview: format!("Overview of {}", title),
            poster_path: Some(format!("/poster-{}.jpg", id)),
            backdrop_path: None,
            release_date: chrono::NaiveDate::from_ymd_opt(2020, 1, 1),
            vote_average: 7.5,
            vote_count: 1200,
            genre_ids: vec![28],
            popularity: 42.0,
            original_language: "en".to_string(),
            original_title: title.to_string(),
            adult: false,
            video: false,
        }
    }

    pub fn details(id: i64) -> MovieDetails {
        MovieDetails {
            movie: movie(id),
            genres: vec![Genre {
                id: 28,
                name: "Action".into(),
            }],
            runtime: Some(123),
            budget: 1_000_000,
            revenue: 5_000_000,
            status: "Released".into(),
            tagline: "A test movie".into(),
        }
    }

    pub fn page_of(page: u32, ids: &[i64], total_pages: u32) -> MoviePage {
        MoviePage {
            page,
            results: ids.iter().map(|id| movie(*id)).collect(),
            total_pages,
            total_results: ids.len() as u32,
        }
    }
}

