use super::actor::{FeedSourceActor, FeedSourceActorHandle};
use super::manager::FeedSourceManager;
use super::models::FeedLoad;
use crate::error::CalendarResult;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the feed source actor
#[derive(Clone)]
pub struct FeedSourceHandle {
    actor_handle: FeedSourceActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl FeedSourceHandle {
    /// Create a new FeedSourceHandle and spawn the actor
    pub fn new(manager: FeedSourceManager) -> Self {
        let (mut actor, handle) = FeedSourceActor::new(manager);

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Load events, reusing the cache while it is fresh
    pub async fn load(&self) -> CalendarResult<FeedLoad> {
        self.actor_handle.load().await
    }

    /// Fetch events regardless of cache age
    pub async fn refresh(&self) -> CalendarResult<FeedLoad> {
        self.actor_handle.refresh().await
    }

    /// Switch to another feed address
    pub async fn set_source(&self, address: impl Into<String>) -> CalendarResult<()> {
        self.actor_handle.set_source(address.into()).await
    }

    /// Remove the cached feed
    pub async fn clear_cache(&self) -> CalendarResult<()> {
        self.actor_handle.clear_cache().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CalendarResult<()> {
        self.actor_handle.shutdown().await
    }
}
