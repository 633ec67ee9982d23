use super::manager::FeedSourceManager;
use super::models::FeedLoad;
use crate::error::{component_error, CalendarResult};
use tokio::sync::mpsc;
use tracing::info;

/// The feed source actor that serializes loads and refreshes
pub struct FeedSourceActor {
    manager: FeedSourceManager,
    command_rx: mpsc::Receiver<FeedSourceCommand>,
}

/// Commands that can be sent to the feed source actor
pub enum FeedSourceCommand {
    Load(mpsc::Sender<FeedLoad>),
    Refresh(mpsc::Sender<FeedLoad>),
    SetSource(String, mpsc::Sender<CalendarResult<()>>),
    ClearCache(mpsc::Sender<CalendarResult<()>>),
    Shutdown,
}

/// Handle for communicating with the feed source actor
#[derive(Clone)]
pub struct FeedSourceActorHandle {
    command_tx: mpsc::Sender<FeedSourceCommand>,
}

impl FeedSourceActorHandle {
    /// Load events, reusing the cache while it is fresh
    pub async fn load(&self) -> CalendarResult<FeedLoad> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(FeedSourceCommand::Load(response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))
    }

    /// Fetch events regardless of cache age
    pub async fn refresh(&self) -> CalendarResult<FeedLoad> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(FeedSourceCommand::Refresh(response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))
    }

    /// Switch to another feed address
    pub async fn set_source(&self, address: String) -> CalendarResult<()> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(FeedSourceCommand::SetSource(address, response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    /// Remove the cached feed
    pub async fn clear_cache(&self) -> CalendarResult<()> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(FeedSourceCommand::ClearCache(response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CalendarResult<()> {
        let _ = self.command_tx.send(FeedSourceCommand::Shutdown).await;
        Ok(())
    }
}

impl FeedSourceActor {
    /// Create a new actor and return its handle
    pub fn new(manager: FeedSourceManager) -> (Self, FeedSourceActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            manager,
            command_rx,
        };

        let handle = FeedSourceActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Feed source actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                FeedSourceCommand::Load(response_tx) => {
                    let result = self.manager.load().await;
                    let _ = response_tx.send(result).await;
                }
                FeedSourceCommand::Refresh(response_tx) => {
                    let result = self.manager.refresh().await;
                    let _ = response_tx.send(result).await;
                }
                FeedSourceCommand::SetSource(address, response_tx) => {
                    let result = self.manager.set_source(&address).await;
                    let _ = response_tx.send(result).await;
                }
                FeedSourceCommand::ClearCache(response_tx) => {
                    let result = self.manager.clear_cache().await;
                    let _ = response_tx.send(result).await;
                }
                FeedSourceCommand::Shutdown => {
                    info!("Feed source actor shutting down");
                    break;
                }
            }
        }

        info!("Feed source actor shut down");
    }
}
