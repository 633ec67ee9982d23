use chrono::{Month, NaiveDate, TimeZone, Utc};
use kalenteri::components::calendar_view::{build_month_grid, events_in_month, google_calendar_link};
use kalenteri::components::cache_store::MemoryCacheStore;
use kalenteri::components::feed_source::manager::demo_events;
use kalenteri::components::feed_source::FeedSource;
use kalenteri::components::ics::{decode, encode, ExportEvent};
use kalenteri::components::ComponentManager;
use kalenteri::config::{CacheBackend, Config, FileConfig};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Smoke test to verify that the config can be built
#[tokio::test]
async fn test_config_loads() {
    let config = Config::from_sources(
        |key| match key {
            "FEED_URL" => Some("webcal://example.com/calendar.ics".to_string()),
            "CACHE_BACKEND" => Some("memory".to_string()),
            _ => None,
        },
        FileConfig::default(),
    )
    .unwrap();

    assert_eq!(config.feed_url, "webcal://example.com/calendar.ics");
    assert_eq!(config.cache_backend, CacheBackend::Memory);
    assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
    assert_eq!(config.tz().unwrap(), chrono_tz::UTC);
}

/// Smoke test for the component lifecycle
#[tokio::test]
async fn test_component_manager_lifecycle() {
    let config = Arc::new(RwLock::new(Config::with_feed_url("https://example.com/calendar.ics")));
    let mut manager = ComponentManager::new(Arc::clone(&config));
    manager.register(FeedSource::new());

    assert!(manager.feed_source_handle().await.is_none());
    assert_eq!(
        manager.get_config().read().await.feed_url,
        "https://example.com/calendar.ics"
    );
    manager.init_all(Arc::new(MemoryCacheStore::new())).await.unwrap();

    let component = manager.get_component_by_name("feed_source").unwrap();
    assert_eq!(component.name(), "feed_source");
    assert!(manager.feed_source_handle().await.is_some());

    assert!(manager.shutdown_all().await.is_ok());
}

/// Decoded events survive an export round trip
#[test]
fn test_export_round_trip() {
    let tz = chrono_tz::UTC;
    let export = ExportEvent {
        title: "Choir rehearsal".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 2, 12).unwrap(),
        time: Some("6:30 PM".to_string()),
        location: Some("Hall B".to_string()),
        ..Default::default()
    };

    let events = decode(&encode(&export, &tz).unwrap(), &tz);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Choir rehearsal");
    assert_eq!(events[0].location, "Hall B");
    assert_eq!(events[0].start, Some(Utc.with_ymd_and_hms(2026, 2, 12, 18, 30, 0).unwrap()));
    assert_eq!(events[0].end, Some(Utc.with_ymd_and_hms(2026, 2, 12, 20, 30, 0).unwrap()));
}

/// The bundled sample feed feeds every view
#[test]
fn test_demo_events_render() {
    let tz = chrono_tz::UTC;
    let events = demo_events(&tz);

    let grid = build_month_grid(2026, Month::November).unwrap();
    assert!(grid.len() >= 4);

    let november = events_in_month(&events, 2026, Month::November, &tz);
    assert!(!november.is_empty());

    let link = google_calendar_link(&november[0], &tz);
    assert!(link.starts_with("https://calendar.google.com/calendar/render?action=TEMPLATE"));
}
