use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use kalenteri::components::cache_store::{keys, CacheEntry, CacheStore, FileCacheStore};
use kalenteri::components::feed_source::{FeedFetcher, FeedSourceManager, FeedTier};
use kalenteri::components::ics::CalendarEvent;
use kalenteri::config::Config;
use kalenteri::error::{cache_error, feed_error, CalendarResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

const FEED: &str = "https://example.com/calendar.ics";

/// Mock implementation of a cache backend whose storage can be made to fail
#[derive(Debug, Default)]
pub struct MockCacheStore {
    data: Mutex<HashMap<String, CacheEntry>>,
    failing: AtomicBool,
}

impl MockCacheStore {
    /// Create a new mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail
    pub fn break_storage(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> CalendarResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(cache_error("Storage unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for MockCacheStore {
    async fn load(&self, key: &str) -> CalendarResult<Option<CacheEntry>> {
        self.check()?;
        Ok(self.data.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, entry: &CacheEntry) -> CalendarResult<()> {
        self.check()?;
        self.data.lock().await.insert(key.to_string(), entry.clone());
        Ok(())
    }

    async fn clear(&self, key: &str) -> CalendarResult<()> {
        self.check()?;
        self.data.lock().await.remove(key);
        Ok(())
    }
}

/// Transport that succeeds until switched off
struct ToggleFetcher {
    online: AtomicBool,
}

#[async_trait]
impl FeedFetcher for ToggleFetcher {
    async fn fetch(&self, _address: &str) -> CalendarResult<String> {
        if self.online.load(Ordering::SeqCst) {
            Ok("BEGIN:VEVENT\r\nUID:standup\r\nSUMMARY:Standup\r\nDTSTART:20260210T090000Z\r\nEND:VEVENT\r\n".to_string())
        } else {
            Err(feed_error("Failed to fetch feed: connection refused"))
        }
    }
}

fn config() -> Arc<RwLock<Config>> {
    Arc::new(RwLock::new(Config::with_feed_url(FEED)))
}

#[tokio::test]
async fn test_mock_store_round_trip() {
    let store = MockCacheStore::new();
    let entry = CacheEntry::new(
        vec![CalendarEvent {
            id: "event1".to_string(),
            title: "Test Event 1".to_string(),
            start: Some(Utc.with_ymd_and_hms(2026, 2, 10, 9, 0, 0).unwrap()),
            ..Default::default()
        }],
        Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap(),
        FEED,
    );

    store.save(keys::FEED_CACHE, &entry).await.unwrap();
    assert_eq!(store.load(keys::FEED_CACHE).await.unwrap(), Some(entry));

    store.clear(keys::FEED_CACHE).await.unwrap();
    assert_eq!(store.load(keys::FEED_CACHE).await.unwrap(), None);
}

#[tokio::test]
async fn test_storage_failure_does_not_break_live_load() {
    let store = Arc::new(MockCacheStore::new());
    store.break_storage();
    let fetcher = Arc::new(ToggleFetcher {
        online: AtomicBool::new(true),
    });
    let manager = FeedSourceManager::new(config(), fetcher, store.clone());

    let load = manager.load().await;
    assert_eq!(load.tier, FeedTier::Live);
    assert_eq!(load.events[0].title, "Standup");
}

#[tokio::test]
async fn test_storage_failure_on_fallback_serves_demo() {
    let store = Arc::new(MockCacheStore::new());
    let fetcher = Arc::new(ToggleFetcher {
        online: AtomicBool::new(true),
    });
    let manager = FeedSourceManager::new(config(), fetcher.clone(), store.clone());

    assert_eq!(manager.load().await.tier, FeedTier::Live);

    // Both the network and the cache are gone now
    fetcher.online.store(false, Ordering::SeqCst);
    store.break_storage();
    let load = manager.refresh().await;
    assert_eq!(load.tier, FeedTier::Demo);
    assert!(load.warning.unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_file_store_survives_manager_restart() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Arc::new(ToggleFetcher {
        online: AtomicBool::new(true),
    });

    let first = FeedSourceManager::new(
        config(),
        fetcher.clone(),
        Arc::new(FileCacheStore::new(dir.path())),
    );
    assert_eq!(first.load().await.tier, FeedTier::Live);
    drop(first);

    fetcher.online.store(false, Ordering::SeqCst);
    let second = FeedSourceManager::new(
        config(),
        fetcher,
        Arc::new(FileCacheStore::new(dir.path())),
    );

    // Still fresh on disk, so no fetch is attempted
    let load = second.load().await;
    assert_eq!(load.tier, FeedTier::Cached);
    assert_eq!(load.events[0].id, "standup");

    let load = second.refresh().await;
    assert_eq!(load.tier, FeedTier::Stale);
}
