use crate::config::Config;
use crate::error::{feed_error, CalendarResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Transport for raw feed text
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch the feed at `address`; any transport problem is an error
    async fn fetch(&self, address: &str) -> CalendarResult<String>;
}

/// Fetches feeds over HTTP(S)
#[derive(Clone)]
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> CalendarResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("kalenteri/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| feed_error(&format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Create a fetcher using the configured timeout
    pub fn from_config(config: &Config) -> CalendarResult<Self> {
        Self::new(Duration::from_secs(config.fetch_timeout_secs))
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, address: &str) -> CalendarResult<String> {
        let url = normalize_feed_url(address)?;
        debug!("Fetching feed from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| feed_error(&format!("Failed to fetch feed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(feed_error(&format!("Failed to fetch feed: HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| feed_error(&format!("Failed to read feed body: {}", e)))
    }
}

/// Parse a feed address, mapping `webcal://` to `https://`
pub fn normalize_feed_url(address: &str) -> CalendarResult<Url> {
    let address = address.trim();
    let address = match address
        .strip_prefix("webcals://")
        .or_else(|| address.strip_prefix("webcal://"))
    {
        Some(rest) => format!("https://{}", rest),
        None => address.to_string(),
    };

    let url = Url::parse(&address)
        .map_err(|e| feed_error(&format!("Invalid feed address '{}': {}", address, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(feed_error(&format!("Unsupported feed scheme: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_feed_url() {
        assert_eq!(
            normalize_feed_url("webcal://example.com/cal.ics").unwrap().as_str(),
            "https://example.com/cal.ics"
        );
        assert_eq!(
            normalize_feed_url(" https://example.com/cal.ics ").unwrap().as_str(),
            "https://example.com/cal.ics"
        );
        assert!(normalize_feed_url("ftp://example.com/cal.ics").is_err());
        assert!(normalize_feed_url("not a url").is_err());
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/feed.ics")
            .with_status(200)
            .with_header("content-type", "text/calendar")
            .with_body("BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n")
            .create_async()
            .await;

        let fetcher = HttpFeedFetcher::new(Duration::from_secs(5)).unwrap();
        let body = fetcher
            .fetch(&format!("{}/feed.ics", server.url()))
            .await
            .unwrap();

        assert_eq!(body, "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/feed.ics")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let fetcher = HttpFeedFetcher::new(Duration::from_secs(5)).unwrap();
        let result = fetcher.fetch(&format!("{}/feed.ics", server.url())).await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("503"));
    }
}
