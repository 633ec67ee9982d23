use crate::error::{config_error, env_error, CalendarResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default location of the optional configuration file
pub const CONFIG_FILE: &str = "config/kalenteri.toml";

pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_CACHE_DIR: &str = ".cache/kalenteri";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 900;
pub const DEFAULT_LOCALE: &str = "en";

/// Where cached feed data is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    #[default]
    File,
    Redis,
}

impl FromStr for CacheBackend {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(CacheBackend::Memory),
            "file" => Ok(CacheBackend::File),
            "redis" => Ok(CacheBackend::Redis),
            other => Err(config_error(&format!("Unknown cache backend: {}", other))),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address of the iCalendar feed
    pub feed_url: String,
    /// Zone used for "local" dates and times
    pub timezone: String,
    /// How long a fetched feed stays fresh
    pub cache_ttl_secs: u64,
    /// Cache storage backend
    pub cache_backend: CacheBackend,
    /// Directory for the file cache
    pub cache_dir: PathBuf,
    /// Redis connection string for the redis cache
    pub redis_url: String,
    /// Transport timeout for a single fetch
    pub fetch_timeout_secs: u64,
    /// Interval of the background refresh in watch mode
    pub refresh_interval_secs: u64,
    /// Locale for user-facing text
    pub locale: String,
}

/// Values read from the optional TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub feed_url: Option<String>,
    pub timezone: Option<String>,
    pub cache_ttl_secs: Option<u64>,
    pub cache_backend: Option<CacheBackend>,
    pub cache_dir: Option<PathBuf>,
    pub redis_url: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
    pub refresh_interval_secs: Option<u64>,
    pub locale: Option<String>,
}

impl FileConfig {
    /// Read the file if it exists
    pub fn read(path: &Path) -> CalendarResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

impl Config {
    /// Configuration with defaults for everything but the feed address
    pub fn with_feed_url(feed_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_backend: CacheBackend::default(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }

    /// Load configuration from environment and config file
    pub fn load() -> CalendarResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let file = FileConfig::read(Path::new(CONFIG_FILE))?;
        Self::from_sources(|key| env::var(key).ok(), file)
    }

    /// Merge environment values over file values over defaults
    pub fn from_sources<F>(lookup: F, file: FileConfig) -> CalendarResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let feed_url = lookup("FEED_URL")
            .or(file.feed_url)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| env_error("FEED_URL"))?;

        let mut config = Self::with_feed_url(feed_url);

        if let Some(timezone) = lookup("TIMEZONE").or(file.timezone) {
            config.timezone = timezone;
        }
        if let Some(ttl) = parse_number(&lookup, "CACHE_TTL_SECS")?.or(file.cache_ttl_secs) {
            config.cache_ttl_secs = ttl;
        }
        match lookup("CACHE_BACKEND") {
            Some(backend) => config.cache_backend = backend.parse()?,
            None => {
                if let Some(backend) = file.cache_backend {
                    config.cache_backend = backend;
                }
            }
        }
        if let Some(dir) = lookup("CACHE_DIR").map(PathBuf::from).or(file.cache_dir) {
            config.cache_dir = dir;
        }
        if let Some(redis_url) = lookup("REDIS_URL").or(file.redis_url) {
            config.redis_url = redis_url;
        }
        if let Some(timeout) =
            parse_number(&lookup, "FETCH_TIMEOUT_SECS")?.or(file.fetch_timeout_secs)
        {
            config.fetch_timeout_secs = timeout;
        }
        if let Some(interval) =
            parse_number(&lookup, "REFRESH_INTERVAL_SECS")?.or(file.refresh_interval_secs)
        {
            config.refresh_interval_secs = interval;
        }
        if let Some(locale) = lookup("LOCALE").or(file.locale) {
            config.locale = locale;
        }

        // Fail early on an unknown zone
        config.tz()?;

        Ok(config)
    }

    /// Parsed configured timezone
    pub fn tz(&self) -> CalendarResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Invalid timezone: {}", self.timezone)))
    }

    /// Cache time-to-live as a chrono duration
    pub fn cache_ttl(&self) -> chrono::Duration {
        i64::try_from(self.cache_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }
}

fn parse_number<F>(lookup: &F, key: &str) -> CalendarResult<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|_| config_error(&format!("Invalid {} format", key)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_only_feed_url() {
        let config = Config::from_sources(
            lookup(&[("FEED_URL", "https://example.com/feed.ics")]),
            FileConfig::default(),
        )
        .unwrap();

        assert_eq!(config.feed_url, "https://example.com/feed.ics");
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);
        assert_eq!(config.cache_backend, CacheBackend::File);
        assert_eq!(config.locale, "en");
    }

    #[test]
    fn test_missing_feed_url_is_an_error() {
        let result = Config::from_sources(lookup(&[]), FileConfig::default());
        assert!(matches!(result, Err(crate::error::Error::Environment(_))));
    }

    #[test]
    fn test_environment_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
            feed_url = "https://file.example.com/a.ics"
            timezone = "Europe/Helsinki"
            cache_backend = "redis"
            cache_ttl_secs = 60
            "#,
        )
        .unwrap();

        let config = Config::from_sources(
            lookup(&[("CACHE_TTL_SECS", "120"), ("CACHE_BACKEND", "memory")]),
            file,
        )
        .unwrap();

        assert_eq!(config.feed_url, "https://file.example.com/a.ics");
        assert_eq!(config.timezone, "Europe/Helsinki");
        assert_eq!(config.cache_ttl_secs, 120);
        assert_eq!(config.cache_backend, CacheBackend::Memory);
        assert_eq!(config.tz().unwrap(), chrono_tz::Europe::Helsinki);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_tz = Config::from_sources(
            lookup(&[("FEED_URL", "https://x"), ("TIMEZONE", "Mars/Olympus")]),
            FileConfig::default(),
        );
        assert!(matches!(bad_tz, Err(crate::error::Error::Config(_))));

        let bad_ttl = Config::from_sources(
            lookup(&[("FEED_URL", "https://x"), ("CACHE_TTL_SECS", "soon")]),
            FileConfig::default(),
        );
        assert!(bad_ttl.is_err());

        let bad_backend = Config::from_sources(
            lookup(&[("FEED_URL", "https://x"), ("CACHE_BACKEND", "floppy")]),
            FileConfig::default(),
        );
        assert!(bad_backend.is_err());
    }
}
