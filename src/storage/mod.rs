//! Durable store backends for the persistence adapter.
//!
//! Provides an in-memory store by default, a file-backed store for
//! desktop and CLI hosts, and a no-op store for contexts without durable storage.

mod config;
mod file;
mod memory;
mod noop;

pub use config::{StorageBackend, StorageConfig};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use noop::NoOpStore;

use crate::error::{LeasekitError, Result};
use crate::traits::store::KeyValueStore;

/// Open the store selected by `config`.
///
/// # Errors
///
/// Returns an error if the file backend is selected without a data directory,
/// or if the directory cannot be created.
pub fn open(config: &StorageConfig) -> Result<Box<dyn KeyValueStore>> {
    let store: Box<dyn KeyValueStore> = match config.backend {
        StorageBackend::Memory => Box::new(MemoryStore::new()),
        StorageBackend::File => {
            let dir = config.data_dir.as_ref().ok_or_else(|| {
                LeasekitError::invalid_config("file storage requires a data directory")
            })?;
            Box::new(FileStore::new(dir)?)
        }
        StorageBackend::Unavailable => Box::new(NoOpStore),
    };

    tracing::debug!(
        target: "leasekit::storage",
        backend = %config.backend,
        "Opened subscription store"
    );

    Ok(store)
}
