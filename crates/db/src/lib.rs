pub mod fixtures;
pub mod repositories;

use tracing::info;

use partsdesk_core::config::AppConfig;

pub use repositories::{
    FallbackRepository, InMemoryProductRepository, InMemorySaleRepository, InMemoryStore,
    JsonFileStore, ProductRepository, RemoteApiClient, RepositoryError, SaleRepository,
    SeedOutcome, Store,
};

/// Builds the store described by `config`: the local JSON store alone, or the
/// remote API backed by the local store when `remote.enabled` is set.
pub fn open_store(config: &AppConfig) -> Result<Box<dyn Store>, RepositoryError> {
    let local = JsonFileStore::new(config.store.data_dir.clone());

    if !config.remote.enabled {
        info!(
            event_name = "partsdesk.store.opened",
            backend = "local",
            data_dir = %config.store.data_dir.display(),
            "store opened"
        );
        return Ok(Box::new(local));
    }

    let remote = RemoteApiClient::from_config(&config.remote)?;
    info!(
        event_name = "partsdesk.store.opened",
        backend = "remote_with_fallback",
        base_url = %config.remote.base_url,
        data_dir = %config.store.data_dir.display(),
        "store opened"
    );
    Ok(Box::new(FallbackRepository::new(remote, local)))
}
