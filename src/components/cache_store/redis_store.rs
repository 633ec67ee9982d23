use super::{CacheEntry, CacheStore};
use crate::error::{cache_error, CalendarResult};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client as RedisClient};

/// Cache kept in Redis as a JSON string per key
#[derive(Clone)]
pub struct RedisCacheStore {
    client: RedisClient,
}

impl RedisCacheStore {
    /// Create a store for the given connection string; connects lazily
    pub fn new(redis_url: &str) -> CalendarResult<Self> {
        let client = RedisClient::open(redis_url)
            .map_err(|e| cache_error(&format!("Failed to create Redis client: {}", e)))?;
        Ok(Self { client })
    }

    /// Get a redis connection
    async fn connection(&self) -> CalendarResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| cache_error(&format!("Failed to connect to Redis: {}", e)))
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn load(&self, key: &str) -> CalendarResult<Option<CacheEntry>> {
        let mut redis_conn = self.connection().await?;

        let entry_json: Option<String> = redis_conn
            .get(key)
            .await
            .map_err(|e| cache_error(&format!("Failed to read cache from Redis: {}", e)))?;

        let Some(entry_json) = entry_json else {
            return Ok(None);
        };

        let entry: CacheEntry = serde_json::from_str(&entry_json)
            .map_err(|e| cache_error(&format!("Failed to deserialize cache entry: {}", e)))?;

        Ok(Some(entry))
    }

    async fn save(&self, key: &str, entry: &CacheEntry) -> CalendarResult<()> {
        let mut redis_conn = self.connection().await?;

        let entry_json = serde_json::to_string(entry)
            .map_err(|e| cache_error(&format!("Failed to serialize cache entry: {}", e)))?;

        () = redis_conn
            .set(key, entry_json)
            .await
            .map_err(|e| cache_error(&format!("Failed to save cache to Redis: {}", e)))?;

        Ok(())
    }

    async fn clear(&self, key: &str) -> CalendarResult<()> {
        let mut redis_conn = self.connection().await?;

        let _removed: i64 = redis_conn
            .del(key)
            .await
            .map_err(|e| cache_error(&format!("Failed to clear cache in Redis: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_redis_url_is_rejected() {
        assert!(RedisCacheStore::new("not a url").is_err());
        assert!(RedisCacheStore::new("redis://127.0.0.1:6379").is_ok());
    }
}
