use crate::components::feed_source::FeedLoad;
use crate::components::{ComponentManager, FeedSourceHandle};
use crate::config::Config;
use crate::error::{component_error, CalendarResult};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::RwLock;

// Export submodules
pub mod calendar;
pub mod export;

/// Shared context for all commands
#[derive(Debug)]
pub struct CommandContext {
    pub config: Arc<RwLock<Config>>,
    pub component_manager: Arc<ComponentManager>,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(config: Arc<RwLock<Config>>, component_manager: Arc<ComponentManager>) -> Self {
        Self {
            config,
            component_manager,
        }
    }

    /// Handle of the running feed source
    pub async fn feed_handle(&self) -> CalendarResult<FeedSourceHandle> {
        self.component_manager
            .feed_source_handle()
            .await
            .ok_or_else(|| component_error("Feed source is not running"))
    }

    /// Configured timezone
    pub async fn tz(&self) -> CalendarResult<Tz> {
        self.config.read().await.tz()
    }
}

/// Type alias for command output
pub type CommandResult = CalendarResult<String>;

/// Prefix command output with the fallback notice, if any
pub fn with_notice(load: &FeedLoad, body: String) -> String {
    match load.notice() {
        Some(notice) => format!("{}\n\n{}", notice, body),
        None => body,
    }
}
