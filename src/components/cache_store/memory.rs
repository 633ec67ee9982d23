use super::{CacheEntry, CacheStore};
use crate::error::{cache_error, CalendarResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Process-local cache, entries kept as serialized JSON
#[derive(Debug, Clone, Default)]
pub struct MemoryCacheStore {
    data: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryCacheStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn load(&self, key: &str) -> CalendarResult<Option<CacheEntry>> {
        let data = self.data.lock().await;

        match data.get(key) {
            Some(json) => {
                let entry = serde_json::from_str(json)
                    .map_err(|e| cache_error(&format!("Failed to deserialize cache entry: {e}")))?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, entry: &CacheEntry) -> CalendarResult<()> {
        let json = serde_json::to_string(entry)
            .map_err(|e| cache_error(&format!("Failed to serialize cache entry: {e}")))?;
        let mut data = self.data.lock().await;
        data.insert(key.to_string(), json);
        Ok(())
    }

    async fn clear(&self, key: &str) -> CalendarResult<()> {
        let mut data = self.data.lock().await;
        data.remove(key);
        Ok(())
    }
}
