use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration as TokioDuration};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::handle::FeedSourceHandle;
use crate::components::calendar_view::query::events_on_date;
use crate::components::ics::time::local_date;
use crate::config::Config;

/// Start the periodic refresh loop
pub async fn start_scheduler(
    config: Arc<RwLock<Config>>,
    handle: FeedSourceHandle,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let config = config.read().await;
    let interval = TokioDuration::from_secs(config.refresh_interval_secs.max(1));
    let tz = config.tz().unwrap_or_else(|e| {
        warn!("{}, falling back to UTC", e);
        chrono_tz::UTC
    });
    drop(config);

    info!("Refreshing feed every {} seconds", interval.as_secs());

    tokio::spawn(async move {
        loop {
            match handle.refresh().await {
                Ok(load) => {
                    let today = local_date(Utc::now(), &tz);
                    let todays = events_on_date(&load.events, today, &tz);
                    info!(
                        tier = ?load.tier,
                        total = load.events.len(),
                        "{} event(s) today ({})",
                        todays.len(),
                        today
                    );
                    if let Some(warning) = &load.warning {
                        warn!("Feed refresh fell back: {}", warning);
                    }
                }
                Err(e) => {
                    error!("Failed to refresh feed: {}", e);
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Refresh scheduler stopped");
                    break;
                }
                _ = sleep(interval) => {}
            }
        }
    })
}
