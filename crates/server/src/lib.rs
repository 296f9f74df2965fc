use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use movie_explorer_core::{
    Config,
    services::{
        BrowseCoordinator, CatalogSource, FavoritesStorage, FavoritesStore, FileStorage,
        TmdbService,
    },
};

pub mod error;
pub mod routes;

pub use error::{ApiError, ApiResult};

use routes::{browse, catalog, favorites, ws};

pub struct AppState {
    pub catalog: Arc<dyn CatalogSource>,
    pub coordinator: Arc<BrowseCoordinator>,
    pub favorites: FavoritesStore,
    pub api_key_configured: bool,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        favorites: FavoritesStore,
        api_key_configured: bool,
    ) -> Self {
        Self {
            coordinator: Arc::new(BrowseCoordinator::new(catalog.clone())),
            catalog,
            favorites,
            api_key_configured,
        }
    }
}

/// Creates the application state with all services initialized
pub fn create_app_state(config: &Config) -> Arc<AppState> {
    let tmdb_service = Arc::new(TmdbService::from_config(config));
    if !tmdb_service.is_configured() {
        tracing::warn!(
            "TMDB API key is not set. Please add TMDB_API_KEY to your environment or .env file"
        );
    }

    let storage = FileStorage::new(&config.data_dir);
    if !storage.is_available() {
        tracing::warn!(
            "Favorites directory {} is not usable, favorites will not be saved",
            storage.dir().display()
        );
    }

    let api_key_configured = tmdb_service.is_configured();
    Arc::new(AppState::new(
        tmdb_service,
        FavoritesStore::new(Arc::new(storage)),
        api_key_configured,
    ))
}

/// Creates the router with all routes configured
pub fn create_router(state: Arc<AppState>, static_dir: Option<&str>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .route("/ws", get(ws::websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Serve static frontend files if directory is configured
    if let Some(dir) = static_dir {
        let index_path = format!("{}/index.html", dir);
        if std::path::Path::new(&index_path).exists() {
            tracing::info!("Serving static files from: {}", dir);
            router = router.fallback_service(
                ServeDir::new(dir).not_found_service(ServeFile::new(&index_path)),
            );
        } else {
            tracing::warn!(
                "Static directory configured but index.html not found: {}",
                dir
            );
        }
    }

    router
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Catalog
        .route("/status", get(catalog::status))
        .route("/genres", get(catalog::genres))
        .route("/movies/{id}", get(catalog::movie_details))
        // Browsing
        .route("/browse", get(browse::get_state))
        .route("/browse/refresh", post(browse::refresh))
        .route("/browse/search", put(browse::set_search))
        .route("/browse/genre", put(browse::set_genre))
        .route("/browse/rating", put(browse::set_rating))
        .route("/browse/clear-filters", post(browse::clear_filters))
        .route("/browse/favorites-view", put(browse::set_favorites_view))
        .route("/browse/next", post(browse::next_page))
        // Favorites
        .route(
            "/favorites",
            get(favorites::list)
                .post(favorites::add)
                .delete(favorites::clear),
        )
        .route("/favorites/toggle", post(favorites::toggle))
        .route(
            "/favorites/{id}",
            get(favorites::check).delete(favorites::remove),
        )
}

async fn health_check() -> &'static str {
    "OK"
}

/// Starts the server and blocks until shutdown
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting Movie Explorer server...");

    let state = create_app_state(&config);

    // Initial trending load so the first snapshot is not empty
    if state.api_key_configured {
        let coordinator = state.coordinator.clone();
        tokio::spawn(async move {
            if let Err(e) = coordinator.refresh().await {
                tracing::warn!("Initial load failed: {}", e);
            }
        });
    }

    let app = create_router(state, config.static_dir.as_deref());

    let addr = config.server_addr();
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
