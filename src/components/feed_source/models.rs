use crate::components::ics::CalendarEvent;
use chrono::{DateTime, Utc};
use rust_i18n::t;
use std::fmt;

/// Which fallback tier produced a set of events
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedTier {
    /// Fetched just now
    Live,
    /// Reused from a cache entry still inside its TTL
    Cached,
    /// Fetch failed, an older cache entry was served
    Stale,
    /// Fetch failed and nothing was cached, the bundled sample was served
    Demo,
}

impl fmt::Display for FeedTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeedTier::Live => "live",
            FeedTier::Cached => "cached",
            FeedTier::Stale => "stale",
            FeedTier::Demo => "demo",
        };
        f.write_str(name)
    }
}

/// Result of loading the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLoad {
    /// Events sorted by start
    pub events: Vec<CalendarEvent>,
    pub tier: FeedTier,
    /// When the served events were fetched; `None` for demo data
    pub fetched_at: Option<DateTime<Utc>>,
    /// Reason the live fetch failed
    pub warning: Option<String>,
}

impl FeedLoad {
    /// Events came from a fallback after a failed fetch
    pub fn is_stale(&self) -> bool {
        self.tier == FeedTier::Stale
    }

    /// Events are the bundled sample, not the real feed
    pub fn is_demo(&self) -> bool {
        self.tier == FeedTier::Demo
    }

    /// Notice for the user when the data is not current
    pub fn notice(&self) -> Option<String> {
        let reason = self.warning.clone().unwrap_or_default();
        match self.tier {
            FeedTier::Live | FeedTier::Cached => None,
            FeedTier::Stale => {
                let fetched_at = self
                    .fetched_at
                    .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
                    .unwrap_or_default();
                Some(t!("feed_stale_notice", fetched_at = fetched_at, reason = reason).to_string())
            }
            FeedTier::Demo => Some(t!("feed_demo_notice", reason = reason).to_string()),
        }
    }
}
