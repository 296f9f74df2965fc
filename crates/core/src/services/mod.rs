pub mod browse;
pub mod cache;
pub mod favorites;
pub mod tmdb;

pub use browse::BrowseCoordinator;
pub use favorites::{FavoritesStorage, FavoritesStore, FileStorage, MemoryStorage};
pub use tmdb::{CatalogSource, TmdbService};
