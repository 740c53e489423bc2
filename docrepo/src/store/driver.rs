use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use super::memory::{InMemoryStore, InMemoryStoreConfig};
use super::{DocumentStore, DocumentStoreProvider};
use crate::common::MEMORY_SCHEME;
use crate::config::ConnectionConfig;
use crate::errors::{ErrorKind, RepoError, RepoResult};

/// Opens [DocumentStore]s for one connection-string scheme.
pub trait StoreDriver: Send + Sync {
    /// The scheme this driver answers to, without `://`.
    fn scheme(&self) -> &str;

    fn connect(&self, config: &ConnectionConfig) -> RepoResult<DocumentStore>;
}

static DRIVERS: Lazy<DashMap<String, Arc<dyn StoreDriver>>> = Lazy::new(|| {
    let drivers: DashMap<String, Arc<dyn StoreDriver>> = DashMap::new();
    drivers.insert(MEMORY_SCHEME.to_string(), Arc::new(MemoryDriver::default()));
    drivers
});

/// Registers `driver` for its scheme, replacing any earlier registration.
pub fn register_driver<D: StoreDriver + 'static>(driver: D) {
    let scheme = driver.scheme().to_ascii_lowercase();
    log::debug!("Registering store driver for scheme {}", scheme);
    DRIVERS.insert(scheme, Arc::new(driver));
}

/// Looks up the driver registered for `scheme`.
///
/// # Errors
///
/// Returns `InvalidConfiguration` if no driver handles the scheme.
pub fn driver_for(scheme: &str) -> RepoResult<Arc<dyn StoreDriver>> {
    match DRIVERS.get(&scheme.to_ascii_lowercase()) {
        Some(driver) => Ok(driver.value().clone()),
        None => {
            log::error!("No store driver registered for scheme {}", scheme);
            Err(RepoError::new(
                &format!("No store driver registered for scheme {}", scheme),
                ErrorKind::InvalidConfiguration,
            ))
        }
    }
}

/// Driver for `memory://`. Connections naming the same hosts and database
/// share one [InMemoryStore] until it is closed.
#[derive(Default)]
pub struct MemoryDriver {
    stores: DashMap<String, InMemoryStore>,
}

impl StoreDriver for MemoryDriver {
    fn scheme(&self) -> &str {
        MEMORY_SCHEME
    }

    fn connect(&self, config: &ConnectionConfig) -> RepoResult<DocumentStore> {
        let key = format!("{}/{}", config.host_list(), config.database());
        let mut entry = self
            .stores
            .entry(key)
            .or_insert_with(|| InMemoryStore::new(InMemoryStoreConfig::new()));

        if entry.is_closed()? {
            log::debug!("Replacing closed in-memory store for {}", config.database());
            *entry = InMemoryStore::new(InMemoryStoreConfig::new());
        }
        Ok(DocumentStore::new(entry.clone()))
    }
}
