use store::{KvStore, RedisStore};
use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::AppError, service::maintenance::MaintenanceService};

/// Installs the global tracing subscriber.
///
/// Log levels come from `RUST_LOG` and default to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Connects to the redis server and verifies it is reachable.
///
/// Opens a managed connection using the URL from configuration and round-trips a `PING`, so
/// a wrong address fails at startup rather than on the first request.
///
/// # Arguments
/// - `config` - Application configuration containing the redis URL
///
/// # Returns
/// - `Ok(RedisStore)` - Connected store handle
/// - `Err(AppError::StoreErr)` - Failed to connect or the server did not answer
pub async fn connect_to_store(config: &Config) -> Result<RedisStore, AppError> {
    let store = RedisStore::connect(&config.redis_url).await?;
    store.ping().await?;

    tracing::info!("Connected to store");
    Ok(store)
}

/// Removes dangling IDs from every global listing.
pub async fn prune_listings<S: KvStore>(store: &S) -> Result<(), AppError> {
    let pruned = MaintenanceService::new(store).prune_all().await?;
    tracing::info!("Startup pruning removed {} dangling ID(s)", pruned);
    Ok(())
}
