//! Locally persisted favorites.
//!
//! The whole set lives in one storage slot as a JSON array of movie
//! snapshots. Every query reads the slot again so edits made by another
//! process are picked up. Storage failures never reach the caller: reads
//! degrade to an empty set and writes become no-ops.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::Movie;

/// Storage slot holding the serialized favorites
pub const FAVORITES_KEY: &str = "movie-favorites";

/// Synchronous key/value slot storage
pub trait FavoritesStorage: Send + Sync {
    /// Whether the backend can currently be used at all.
    fn is_available(&self) -> bool;

    /// Raw slot contents, `None` when the slot was never written.
    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// One `<key>.json` file per slot inside a data directory
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates the data directory up front; queries only ever stat it
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            warn!("Could not create favorites directory {}: {}", dir.display(), e);
        }
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl FavoritesStorage for FileStorage {
    fn is_available(&self) -> bool {
        std::fs::metadata(&self.dir).is_ok_and(|m| m.is_dir())
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.slot_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::StorageUnavailable(e.to_string())),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key);
        let tmp = path.with_extension("json.tmp");

        std::fs::write(&tmp, value).map_err(|e| Error::StorageUnavailable(e.to_string()))?;
        std::fs::rename(&tmp, &path).map_err(|e| Error::StorageUnavailable(e.to_string()))
    }
}

/// Process-local storage, used in tests and when no data directory is usable
#[derive(Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that refuses every operation, like a browser with storage blocked
    pub fn unavailable() -> Self {
        let storage = Self::default();
        storage.set_available(false);
        storage
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }
}

impl FavoritesStorage for MemoryStorage {
    fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        if !self.is_available() {
            return Err(Error::StorageUnavailable("storage disabled".into()));
        }
        let slots = self
            .slots
            .lock()
            .map_err(|_| Error::StorageUnavailable("storage lock poisoned".into()))?;
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if !self.is_available() {
            return Err(Error::StorageUnavailable("storage disabled".into()));
        }
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| Error::StorageUnavailable("storage lock poisoned".into()))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub struct FavoritesStore {
    storage: Arc<dyn FavoritesStorage>,
    // Serializes read-modify-write cycles from concurrent handlers
    write_lock: Mutex<()>,
}

impl FavoritesStore {
    pub fn new(storage: Arc<dyn FavoritesStorage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_available()
    }

    /// Favorites in insertion order; empty if the slot is missing or corrupt
    pub fn list(&self) -> Vec<Movie> {
        self.load().unwrap_or_default()
    }

    pub fn is_favorite(&self, id: i64) -> bool {
        self.list().iter().any(|m| m.id == id)
    }

    pub fn add(&self, movie: &Movie) {
        let _guard = self.write_lock.lock();
        self.add_unlocked(movie);
    }

    pub fn remove(&self, id: i64) {
        let _guard = self.write_lock.lock();
        self.remove_unlocked(id);
    }

    /// Flips membership and returns whether the movie is now a favorite
    pub fn toggle(&self, movie: &Movie) -> bool {
        let _guard = self.write_lock.lock();
        if !self.storage.is_available() {
            return false;
        }

        if self.list().iter().any(|m| m.id == movie.id) {
            self.remove_unlocked(movie.id);
            false
        } else {
            self.add_unlocked(movie);
            self.list().iter().any(|m| m.id == movie.id)
        }
    }

    pub fn clear(&self) {
        let _guard = self.write_lock.lock();
        self.save(&[]);
    }

    fn add_unlocked(&self, movie: &Movie) {
        let Some(mut favorites) = self.load_for_update() else {
            return;
        };
        if favorites.iter().any(|m| m.id == movie.id) {
            return;
        }
        favorites.push(movie.clone());
        self.save(&favorites);
    }

    fn remove_unlocked(&self, id: i64) {
        let Some(mut favorites) = self.load_for_update() else {
            return;
        };
        let before = favorites.len();
        favorites.retain(|m| m.id != id);
        if favorites.len() != before {
            self.save(&favorites);
        }
    }

    /// Current set for a mutation; corrupt contents are replaced by an empty set
    fn load_for_update(&self) -> Option<Vec<Movie>> {
        if !self.storage.is_available() {
            debug!("Favorites storage unavailable, ignoring update");
            return None;
        }
        match self.storage.read(FAVORITES_KEY) {
            Ok(raw) => Some(raw.map(|r| parse_favorites(&r)).unwrap_or_default()),
            Err(e) => {
                warn!("Error reading favorites: {}", e);
                None
            }
        }
    }

    fn load(&self) -> Option<Vec<Movie>> {
        if !self.storage.is_available() {
            return None;
        }
        match self.storage.read(FAVORITES_KEY) {
            Ok(raw) => raw.map(|r| parse_favorites(&r)),
            Err(e) => {
                warn!("Error reading favorites: {}", e);
                None
            }
        }
    }

    fn save(&self, favorites: &[Movie]) {
        let serialized = match serde_json::to_string(favorites) {
            Ok(s) => s,
            Err(e) => {
                warn!("Error serializing favorites: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.write(FAVORITES_KEY, &serialized) {
            warn!("Error writing favorites: {}", e);
        }
    }
}

fn parse_favorites(raw: &str) -> Vec<Movie> {
    match serde_json::from_str::<Vec<Movie>>(raw) {
        Ok(movies) => {
            let mut seen = HashSet::new();
            movies.into_iter().filter(|m| seen.insert(m.id)).collect()
        }
        Err(e) => {
            warn!("Stored favorites are corrupt, treating as empty: {}", e);
            Vec::new()
        }
    }
}
