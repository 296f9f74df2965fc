use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Cache lifetime for listing and detail responses
pub const LISTING_TTL: Duration = Duration::from_secs(60 * 60);

/// Cache lifetime for the genre reference list
pub const GENRE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct CachedBody {
    body: String,
    expires_at: Instant,
}

/// Time-bounded cache of raw response bodies keyed by request path
#[derive(Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CachedBody>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&self, key: String, body: String, ttl: Duration) {
        self.insert_at(key, body, ttl, Instant::now());
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<String> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.body.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn insert_at(&self, key: String, body: String, ttl: Duration, now: Instant) {
        if let Ok(mut entries) = self.entries.lock() {
            // Drop anything expired while we hold the lock
            entries.retain(|_, entry| entry.expires_at > now);
            entries.insert(
                key,
                CachedBody {
                    body,
                    expires_at: now + ttl,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_ttl() {
        let cache = ResponseCache::new();
        cache.insert("/trending/movie/week?page=1".into(), "{}".into(), LISTING_TTL);

        assert_eq!(cache.get("/trending/movie/week?page=1").as_deref(), Some("{}"));
        assert!(cache.get("/trending/movie/week?page=2").is_none());
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let cache = ResponseCache::new();
        let start = Instant::now();
        cache.insert_at("/genre/movie/list".into(), "[]".into(), Duration::from_secs(10), start);

        assert!(cache.get_at("/genre/movie/list", start + Duration::from_secs(5)).is_some());
        assert!(cache.get_at("/genre/movie/list", start + Duration::from_secs(11)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = ResponseCache::new();
        cache.insert("a".into(), "1".into(), GENRE_TTL);
        cache.insert("b".into(), "2".into(), LISTING_TTL);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
