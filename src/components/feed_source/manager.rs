use super::fetcher::FeedFetcher;
use super::models::{FeedLoad, FeedTier};
use crate::components::cache_store::{keys, CacheEntry, CacheStore};
use crate::components::calendar_view::query::sort_by_date;
use crate::components::ics::{decode, CalendarEvent};
use crate::config::Config;
use crate::error::CalendarResult;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Sample feed served when neither the network nor the cache has data
pub const DEMO_FEED: &str = include_str!("demo_feed.ics");

/// How many times a load restarts when the address changes mid-fetch
const MAX_SOURCE_RESTARTS: usize = 3;

/// Applies the TTL and fallback policy for the configured feed
pub struct FeedSourceManager {
    config: Arc<RwLock<Config>>,
    fetcher: Arc<dyn FeedFetcher>,
    store: Arc<dyn CacheStore>,
}

/// Settings read from the shared config at the start of an operation
struct SourceSettings {
    source: String,
    ttl: Duration,
    tz: Tz,
}

impl FeedSourceManager {
    /// Create a new manager
    pub fn new(
        config: Arc<RwLock<Config>>,
        fetcher: Arc<dyn FeedFetcher>,
        store: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            config,
            fetcher,
            store,
        }
    }

    /// Serve fresh cached events, or fetch
    pub async fn load(&self) -> FeedLoad {
        self.load_at(Utc::now()).await
    }

    /// [`load`](Self::load) at a given time
    pub async fn load_at(&self, now: DateTime<Utc>) -> FeedLoad {
        let settings = self.settings().await;

        if let Some(entry) = self.read_cache().await {
            if entry.is_fresh(&settings.source, now, settings.ttl) {
                debug!("Serving cached feed fetched at {}", entry.fetched_at);
                return FeedLoad {
                    events: entry.events,
                    tier: FeedTier::Cached,
                    fetched_at: Some(entry.fetched_at),
                    warning: None,
                };
            }
            debug!("Cached feed is expired or belongs to another source");
        }

        self.fetch_with_fallback(now).await
    }

    /// Fetch regardless of cache age
    pub async fn refresh(&self) -> FeedLoad {
        self.refresh_at(Utc::now()).await
    }

    /// [`refresh`](Self::refresh) at a given time
    pub async fn refresh_at(&self, now: DateTime<Utc>) -> FeedLoad {
        self.fetch_with_fallback(now).await
    }

    /// Point the manager at another feed address.
    ///
    /// An entry cached for the previous address is removed.
    pub async fn set_source(&self, address: &str) -> CalendarResult<()> {
        let previous = {
            let mut config = self.config.write().await;
            std::mem::replace(&mut config.feed_url, address.to_string())
        };

        if previous != address {
            info!("Feed address changed from {} to {}", previous, address);
            if let Some(entry) = self.read_cache().await {
                if !entry.matches_source(address) {
                    self.store.clear(keys::FEED_CACHE).await?;
                }
            }
        }

        Ok(())
    }

    /// Remove the cached entry
    pub async fn clear_cache(&self) -> CalendarResult<()> {
        info!("Clearing feed cache");
        self.store.clear(keys::FEED_CACHE).await
    }

    async fn fetch_with_fallback(&self, now: DateTime<Utc>) -> FeedLoad {
        let mut restarts = 0;

        loop {
            let settings = self.settings().await;
            let result = self.fetcher.fetch(&settings.source).await;

            // The address may have been changed while the request was in flight
            let current = self.config.read().await.feed_url.clone();
            if current != settings.source {
                info!(
                    "Discarding response from {} because the feed address changed",
                    settings.source
                );
                if restarts < MAX_SOURCE_RESTARTS {
                    restarts += 1;
                    continue;
                }
                let settings = self.settings().await;
                return self
                    .fallback(&settings, "feed address kept changing during fetch")
                    .await;
            }

            return match result {
                Ok(text) => self.accept(&settings, &text, now).await,
                Err(e) => self.fallback(&settings, &e.to_string()).await,
            };
        }
    }

    async fn accept(&self, settings: &SourceSettings, text: &str, now: DateTime<Utc>) -> FeedLoad {
        let mut events = decode(text, &settings.tz);
        sort_by_date(&mut events);
        info!("Fetched {} events from {}", events.len(), settings.source);

        let entry = CacheEntry::new(events, now, settings.source.clone());
        if let Err(e) = self.store.save(keys::FEED_CACHE, &entry).await {
            warn!("Failed to save feed cache: {}", e);
        }

        FeedLoad {
            events: entry.events,
            tier: FeedTier::Live,
            fetched_at: Some(now),
            warning: None,
        }
    }

    async fn fallback(&self, settings: &SourceSettings, reason: &str) -> FeedLoad {
        warn!("Feed fetch from {} failed: {}", settings.source, reason);

        if let Some(entry) = self.read_cache().await {
            if entry.matches_source(&settings.source) {
                info!("Serving stale feed fetched at {}", entry.fetched_at);
                return FeedLoad {
                    events: entry.events,
                    tier: FeedTier::Stale,
                    fetched_at: Some(entry.fetched_at),
                    warning: Some(reason.to_string()),
                };
            }
        }

        info!("No cached feed for {}, serving demo events", settings.source);
        FeedLoad {
            events: demo_events(&settings.tz),
            tier: FeedTier::Demo,
            fetched_at: None,
            warning: Some(reason.to_string()),
        }
    }

    /// Cache read where any storage failure counts as a miss
    async fn read_cache(&self) -> Option<CacheEntry> {
        match self.store.load(keys::FEED_CACHE).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to read feed cache: {}", e);
                None
            }
        }
    }

    async fn settings(&self) -> SourceSettings {
        let config = self.config.read().await;
        let tz = config.tz().unwrap_or_else(|e| {
            warn!("{}, falling back to UTC", e);
            chrono_tz::UTC
        });

        SourceSettings {
            source: config.feed_url.clone(),
            ttl: config.cache_ttl(),
            tz,
        }
    }
}

/// Events of the bundled sample feed, sorted by start
pub fn demo_events(tz: &Tz) -> Vec<CalendarEvent> {
    let mut events = decode(DEMO_FEED, tz);
    sort_by_date(&mut events);
    events
}
