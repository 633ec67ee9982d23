use crate::components::cache_store::open_store;
use crate::components::feed_source::FeedSource;
use crate::components::ComponentManager;
use crate::config::Config;
use crate::error::Error;
use crate::shutdown;
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => {
            set_locale(&config.locale);
            Ok(Arc::new(RwLock::new(config)))
        }
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Switch the message catalogue, keeping English for unknown locales
pub fn set_locale(locale: &str) {
    let available = rust_i18n::available_locales!();
    if available.iter().any(|l| *l == locale) {
        info!("Setting locale to {}", locale);
        rust_i18n::set_locale(locale);
    } else {
        info!("Locale {} is not available, using en", locale);
        rust_i18n::set_locale("en");
    }
}

/// Register and initialize the components.
///
/// `watch` additionally starts the periodic refresh.
pub async fn start_components(
    config: Arc<RwLock<Config>>,
    watch: bool,
) -> miette::Result<Arc<ComponentManager>> {
    let store = {
        let config_read = config.read().await;
        open_store(&config_read)?
    };

    let mut component_manager = ComponentManager::new(Arc::clone(&config));

    let feed_source = if watch {
        FeedSource::new().with_refresh_scheduler()
    } else {
        FeedSource::new()
    };
    component_manager.register(feed_source);

    component_manager.init_all(store).await?;

    Ok(Arc::new(component_manager))
}

/// Block until a termination signal has shut the components down
pub async fn wait_for_shutdown(component_manager: Arc<ComponentManager>) {
    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Spawn signal handler task
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, component_manager).await;
    });

    info!("Watching feed, press Ctrl+C to stop");
    if shutdown_recv.await.is_err() {
        error!("Signal handler ended without a shutdown signal");
    }
    info!("Received shutdown signal, exiting");
}
