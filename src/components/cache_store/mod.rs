//! Storage port for fetched feed data.
//!
//! The source manager only talks to [`CacheStore`]; where entries actually
//! live (process memory, a JSON file, Redis) is chosen from configuration.

mod file;
mod memory;
mod redis_store;

pub use self::file::FileCacheStore;
pub use self::memory::MemoryCacheStore;
pub use self::redis_store::RedisCacheStore;

use crate::components::ics::CalendarEvent;
use crate::config::{CacheBackend, Config};
use crate::error::CalendarResult;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

// Storage key constants
pub mod keys {
    pub const FEED_CACHE: &str = "kalenteri:feed_cache";
}

/// Events from one successful fetch
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CacheEntry {
    pub events: Vec<CalendarEvent>,
    pub fetched_at: DateTime<Utc>,
    /// Feed address the events were fetched from
    pub source_key: String,
}

impl CacheEntry {
    /// Create a new entry
    pub fn new(events: Vec<CalendarEvent>, fetched_at: DateTime<Utc>, source_key: impl Into<String>) -> Self {
        Self {
            events,
            fetched_at,
            source_key: source_key.into(),
        }
    }

    /// Whether the entry belongs to the given feed address
    pub fn matches_source(&self, source_key: &str) -> bool {
        self.source_key == source_key
    }

    /// Whether the entry may be served without fetching
    pub fn is_fresh(&self, source_key: &str, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.matches_source(source_key) && now - self.fetched_at < ttl
    }
}

/// Load/save port for cache entries
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the entry stored under `key`
    async fn load(&self, key: &str) -> CalendarResult<Option<CacheEntry>>;

    /// Overwrite the entry stored under `key`
    async fn save(&self, key: &str, entry: &CacheEntry) -> CalendarResult<()>;

    /// Remove the entry stored under `key`
    async fn clear(&self, key: &str) -> CalendarResult<()>;
}

/// Build the store selected in the configuration
pub fn open_store(config: &Config) -> CalendarResult<Arc<dyn CacheStore>> {
    let store: Arc<dyn CacheStore> = match config.cache_backend {
        CacheBackend::Memory => Arc::new(MemoryCacheStore::new()),
        CacheBackend::File => Arc::new(FileCacheStore::new(config.cache_dir.clone())),
        CacheBackend::Redis => Arc::new(RedisCacheStore::new(&config.redis_url)?),
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entry_freshness() {
        let fetched_at = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        let entry = CacheEntry::new(Vec::new(), fetched_at, "https://a.example/feed.ics");
        let ttl = Duration::hours(1);

        assert!(entry.is_fresh("https://a.example/feed.ics", fetched_at + Duration::minutes(59), ttl));
        assert!(!entry.is_fresh("https://a.example/feed.ics", fetched_at + Duration::hours(1), ttl));
        assert!(!entry.is_fresh("https://b.example/feed.ics", fetched_at, ttl));
    }

    #[test]
    fn test_entry_serializes_dates_as_iso_strings() {
        let fetched_at = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        let entry = CacheEntry::new(
            vec![CalendarEvent {
                id: "e1".to_string(),
                start: Some(Utc.with_ymd_and_hms(2026, 2, 3, 9, 0, 0).unwrap()),
                ..Default::default()
            }],
            fetched_at,
            "src",
        );

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["fetched_at"], "2026-02-01T12:00:00Z");
        assert_eq!(json["events"][0]["start"], "2026-02-03T09:00:00Z");
        assert_eq!(json["source_key"], "src");

        let back: CacheEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
