mod actor;
pub mod fetcher;
mod handle;
pub mod manager;
pub mod models;
mod scheduler;

pub use fetcher::{FeedFetcher, HttpFeedFetcher};
pub use handle::FeedSourceHandle;
pub use manager::FeedSourceManager;
pub use models::{FeedLoad, FeedTier};

use crate::components::cache_store::CacheStore;
use crate::config::Config;
use crate::error::{component_error, CalendarResult};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use self::scheduler::start_scheduler;

/// Feed source component owning the actor and the refresh scheduler
#[derive(Default)]
pub struct FeedSource {
    handle: RwLock<Option<FeedSourceHandle>>,
    fetcher: Option<Arc<dyn FeedFetcher>>,
    refresh_scheduler: bool,
    cancel: CancellationToken,
    scheduler_task: RwLock<Option<JoinHandle<()>>>,
}

impl FeedSource {
    /// Create a new feed source component
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the feed periodically once initialized
    pub fn with_refresh_scheduler(mut self) -> Self {
        self.refresh_scheduler = true;
        self
    }

    /// Use a custom transport instead of HTTP
    pub fn with_fetcher(mut self, fetcher: Arc<dyn FeedFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Get the handle if it exists
    pub async fn get_handle(&self) -> Option<FeedSourceHandle> {
        let handle_lock = self.handle.read().await;
        handle_lock.clone()
    }
}

#[async_trait]
impl super::Component for FeedSource {
    fn name(&self) -> &'static str {
        "feed_source"
    }

    async fn init(&self, config: Arc<RwLock<Config>>, store: Arc<dyn CacheStore>) -> CalendarResult<()> {
        let mut handle_lock = self.handle.write().await;
        if handle_lock.is_some() {
            return Ok(());
        }

        let fetcher: Arc<dyn FeedFetcher> = match &self.fetcher {
            Some(fetcher) => Arc::clone(fetcher),
            None => Arc::new(HttpFeedFetcher::from_config(&*config.read().await)?),
        };

        let manager = FeedSourceManager::new(Arc::clone(&config), fetcher, store);
        let handle = FeedSourceHandle::new(manager);
        *handle_lock = Some(handle.clone());
        drop(handle_lock);

        if self.refresh_scheduler {
            let task = start_scheduler(config, handle, self.cancel.clone()).await;
            *self.scheduler_task.write().await = Some(task);
        }

        Ok(())
    }

    async fn shutdown(&self) -> CalendarResult<()> {
        self.cancel.cancel();
        if let Some(task) = self.scheduler_task.write().await.take() {
            task.await
                .map_err(|e| component_error(&format!("Refresh scheduler task failed: {}", e)))?;
        }

        // Shutdown the handle if it exists
        let handle_lock = self.handle.read().await;
        if let Some(handle) = &*handle_lock {
            handle.shutdown().await?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
