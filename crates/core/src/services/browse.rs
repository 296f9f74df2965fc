//! Paginated browsing over the catalog.
//!
//! [`BrowseState`] is a plain value with synchronous transitions; it never
//! performs I/O. [`BrowseCoordinator`] owns one state behind a lock, runs the
//! fetch each transition asks for and applies the completion. Every query
//! change starts a new generation; late responses tagged with an older
//! generation are dropped.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{BrowseSnapshot, Movie, MoviePage, QueryMode};
use crate::services::CatalogSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// First page of a new query; replaces the accumulated items
    Replace,
    /// Next page of the current query; appended to the accumulated items
    Append,
}

/// A fetch issued by a transition, tagged with the generation it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub generation: u64,
    pub mode: QueryMode,
    pub page: u32,
    pub kind: FetchKind,
}

#[derive(Debug, Clone)]
pub struct BrowseState {
    search_query: String,
    genre_id: Option<i32>,
    min_rating: Option<f64>,
    mode: QueryMode,
    page: u32,
    items: Vec<Movie>,
    seen_ids: HashSet<i64>,
    has_more: bool,
    loading: bool,
    favorites_view: bool,
    generation: u64,
    last_error: Option<String>,
}

impl Default for BrowseState {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            genre_id: None,
            min_rating: None,
            mode: QueryMode::Trending,
            page: 1,
            items: Vec::new(),
            seen_ids: HashSet::new(),
            has_more: false,
            loading: false,
            favorites_view: false,
            generation: 0,
            last_error: None,
        }
    }
}

impl BrowseState {
    pub fn mode(&self) -> &QueryMode {
        &self.mode
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn items(&self) -> &[Movie] {
        &self.items
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_search_query(&mut self, text: &str) -> FetchTicket {
        self.search_query = text.trim().to_string();
        self.restart()
    }

    pub fn set_genre_filter(&mut self, genre_id: Option<i32>) -> FetchTicket {
        self.genre_id = genre_id;
        self.restart()
    }

    pub fn set_rating_filter(&mut self, min_rating: Option<f64>) -> Result<FetchTicket> {
        if let Some(rating) = min_rating
            && !(0.0..=10.0).contains(&rating)
        {
            return Err(Error::Validation(format!(
                "Minimum rating must be between 0 and 10, got {}",
                rating
            )));
        }
        self.min_rating = min_rating;
        Ok(self.restart())
    }

    pub fn clear_filters(&mut self) -> FetchTicket {
        self.genre_id = None;
        self.min_rating = None;
        self.restart()
    }

    pub fn set_favorites_view(&mut self, active: bool) {
        self.favorites_view = active;
    }

    /// Starts a new generation at page 1 of whatever the inputs resolve to
    pub fn restart(&mut self) -> FetchTicket {
        self.generation += 1;
        self.mode = QueryMode::resolve(&self.search_query, self.genre_id, self.min_rating);
        self.page = 1;
        self.items.clear();
        self.seen_ids.clear();
        // No scrolling past an empty list until page 1 has arrived
        self.has_more = false;
        self.loading = true;
        self.last_error = None;

        FetchTicket {
            generation: self.generation,
            mode: self.mode.clone(),
            page: 1,
            kind: FetchKind::Replace,
        }
    }

    /// Ticket for the following page, or `None` if paging is not possible now
    pub fn begin_next_page(&mut self) -> Option<FetchTicket> {
        if self.loading || !self.has_more || self.favorites_view {
            return None;
        }
        self.loading = true;

        Some(FetchTicket {
            generation: self.generation,
            mode: self.mode.clone(),
            page: self.page + 1,
            kind: FetchKind::Append,
        })
    }

    /// Applies a finished fetch. Responses from an older generation leave the
    /// state untouched and yield `Error::Stale`.
    pub fn complete(&mut self, ticket: &FetchTicket, result: Result<MoviePage>) -> Result<()> {
        if ticket.generation != self.generation {
            return Err(Error::Stale);
        }
        self.loading = false;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        if ticket.kind == FetchKind::Replace {
            self.items.clear();
            self.seen_ids.clear();
        }
        for movie in page.results {
            if self.seen_ids.insert(movie.id) {
                self.items.push(movie);
            }
        }
        self.page = ticket.page;
        self.has_more = ticket.page < page.total_pages;
        self.last_error = None;
        Ok(())
    }

    pub fn snapshot(&self) -> BrowseSnapshot {
        BrowseSnapshot {
            mode: self.mode.clone(),
            search_query: self.search_query.clone(),
            genre_id: self.genre_id,
            min_rating: self.min_rating,
            page: self.page,
            items: self.items.clone(),
            loading: self.loading,
            has_more: self.has_more,
            favorites_view: self.favorites_view,
            last_error: self.last_error.clone(),
        }
    }
}

pub struct BrowseCoordinator {
    catalog: Arc<dyn CatalogSource>,
    state: Mutex<BrowseState>,
    snapshots: watch::Sender<BrowseSnapshot>,
}

impl BrowseCoordinator {
    pub fn new(catalog: Arc<dyn CatalogSource>) -> Self {
        let state = BrowseState::default();
        let (snapshots, _) = watch::channel(state.snapshot());
        Self {
            catalog,
            state: Mutex::new(state),
            snapshots,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<BrowseSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> BrowseSnapshot {
        self.snapshots.borrow().clone()
    }

    pub async fn set_search_query(&self, text: &str) -> Result<()> {
        let ticket = self.transition(|s| s.set_search_query(text));
        self.run(ticket).await.map(|_| ())
    }

    pub async fn set_genre_filter(&self, genre_id: Option<i32>) -> Result<()> {
        let ticket = self.transition(|s| s.set_genre_filter(genre_id));
        self.run(ticket).await.map(|_| ())
    }

    pub async fn set_rating_filter(&self, min_rating: Option<f64>) -> Result<()> {
        let ticket = self.transition(|s| s.set_rating_filter(min_rating))?;
        self.run(ticket).await.map(|_| ())
    }

    pub async fn clear_filters(&self) -> Result<()> {
        let ticket = self.transition(|s| s.clear_filters());
        self.run(ticket).await.map(|_| ())
    }

    /// Reloads page 1 of the current query (initial load, user retry)
    pub async fn refresh(&self) -> Result<()> {
        let ticket = self.transition(|s| s.restart());
        self.run(ticket).await.map(|_| ())
    }

    pub fn set_favorites_view(&self, active: bool) {
        self.transition(|s| s.set_favorites_view(active));
    }

    /// Loads and appends the next page. Returns `Ok(false)` when the request
    /// was dropped (already loading, no more pages, favorites shown) or its
    /// response was superseded by a newer query.
    pub async fn request_next_page(&self) -> Result<bool> {
        let Some(ticket) = self.transition(|s| s.begin_next_page()) else {
            debug!("Next page request dropped");
            return Ok(false);
        };
        self.run(ticket).await
    }

    fn transition<R>(&self, f: impl FnOnce(&mut BrowseState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let out = f(&mut state);
        self.snapshots.send_replace(state.snapshot());
        out
    }

    async fn run(&self, ticket: FetchTicket) -> Result<bool> {
        let result = self.fetch(&ticket).await;

        match self.transition(|s| s.complete(&ticket, result)) {
            Ok(()) => Ok(true),
            Err(Error::Stale) => {
                debug!(
                    "Discarded stale response for generation {} page {}",
                    ticket.generation, ticket.page
                );
                Ok(false)
            }
            Err(e) => {
                warn!("Error fetching movies: {}", e);
                Err(e)
            }
        }
    }

    async fn fetch(&self, ticket: &FetchTicket) -> Result<MoviePage> {
        match &ticket.mode {
            QueryMode::Trending => self.catalog.trending(ticket.page).await,
            QueryMode::Search { query } => self.catalog.search(query, ticket.page).await,
            QueryMode::Discover {
                genre_id,
                min_rating,
            } => {
                self.catalog
                    .discover(ticket.page, *genre_id, *min_rating)
                    .await
            }
        }
    }
}
