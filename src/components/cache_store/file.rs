use super::{CacheEntry, CacheStore};
use crate::error::{cache_error, CalendarResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Cache persisted as one JSON file per key
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    /// Store files under `dir`; the directory is created on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn load(&self, key: &str) -> CalendarResult<Option<CacheEntry>> {
        let path = self.path_for(key);
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(cache_error(&format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let entry = serde_json::from_str(&json)
            .map_err(|e| cache_error(&format!("Failed to deserialize cache entry: {}", e)))?;
        Ok(Some(entry))
    }

    async fn save(&self, key: &str, entry: &CacheEntry) -> CalendarResult<()> {
        let json = serde_json::to_string_pretty(entry)
            .map_err(|e| cache_error(&format!("Failed to serialize cache entry: {}", e)))?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            cache_error(&format!("Failed to create {}: {}", self.dir.display(), e))
        })?;

        let path = self.path_for(key);
        // Write to a sibling file first so readers never see a partial entry
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| cache_error(&format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| cache_error(&format!("Failed to write {}: {}", path.display(), e)))?;

        Ok(())
    }

    async fn clear(&self, key: &str) -> CalendarResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(cache_error(&format!("Failed to clear cache: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::cache_store::keys;
    use crate::components::ics::CalendarEvent;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCacheStore::new(dir.path().join("nested"));

        assert_eq!(store.load(keys::FEED_CACHE).await.unwrap(), None);

        let entry = CacheEntry::new(
            vec![CalendarEvent {
                id: "e1".to_string(),
                title: "Stored".to_string(),
                start: Some(Utc.with_ymd_and_hms(2026, 2, 3, 9, 0, 0).unwrap()),
                ..Default::default()
            }],
            Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap(),
            "https://example.com/feed.ics",
        );
        store.save(keys::FEED_CACHE, &entry).await.unwrap();

        assert!(store.path_for(keys::FEED_CACHE).ends_with("kalenteri_feed_cache.json"));
        assert_eq!(store.load(keys::FEED_CACHE).await.unwrap(), Some(entry));

        store.clear(keys::FEED_CACHE).await.unwrap();
        assert_eq!(store.load(keys::FEED_CACHE).await.unwrap(), None);
        // Clearing twice is fine
        store.clear(keys::FEED_CACHE).await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCacheStore::new(dir.path());
        tokio::fs::write(store.path_for(keys::FEED_CACHE), "{not json")
            .await
            .unwrap();

        assert!(store.load(keys::FEED_CACHE).await.is_err());
    }
}
