use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{LeasekitError, Result};
use crate::traits::store::KeyValueStore;

const TARGET: &str = "leasekit::persistence";

/// JSON persistence over a [`KeyValueStore`].
///
/// `save` and `load` never fail. Use [`try_save`](Self::try_save) when the
/// caller needs to know whether the write landed.
#[derive(Debug, Clone)]
pub struct Persistence<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether the underlying store can be used in this context.
    pub fn is_available(&self) -> bool {
        self.store.is_available()
    }

    /// Serialize `value` and write it under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LeasekitError::StorageUnavailable`] when the store is
    /// unavailable, a serialization error if `value` cannot be encoded, or the
    /// store's own error if the write fails.
    pub fn try_save<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        if !self.store.is_available() {
            return Err(LeasekitError::StorageUnavailable);
        }
        let encoded = serde_json::to_string(value)?;
        self.store.set(key, &encoded)
    }

    /// Serialize `value` and write it under `key`, logging instead of failing.
    pub fn save<T>(&self, key: &str, value: &T)
    where
        T: Serialize + ?Sized,
    {
        match self.try_save(key, value) {
            Ok(()) => {
                tracing::trace!(target: TARGET, key = %key, "Saved value");
            }
            Err(LeasekitError::StorageUnavailable) => {
                tracing::debug!(target: TARGET, key = %key, "Store unavailable, skipping save");
            }
            Err(e) => {
                tracing::warn!(target: TARGET, key = %key, error = %e, "Failed to save value");
            }
        }
    }

    /// Read and decode the value under `key`.
    ///
    /// Returns `None` when the key is missing, the store is unavailable or
    /// unreadable, or the stored text does not decode as `T`.
    pub fn load_existing<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        if !self.store.is_available() {
            tracing::debug!(target: TARGET, key = %key, "Store unavailable, using default");
            return None;
        }

        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(target: TARGET, key = %key, error = %e, "Failed to read value");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    target: TARGET,
                    key = %key,
                    error = %e,
                    "Discarding unreadable stored value"
                );
                None
            }
        }
    }

    /// Read and decode the value under `key`, falling back to `default`.
    pub fn load<T>(&self, key: &str, default: T) -> T
    where
        T: DeserializeOwned,
    {
        self.load_existing(key).unwrap_or(default)
    }

    /// Delete the value under `key`, logging instead of failing.
    pub fn remove(&self, key: &str) {
        if !self.store.is_available() {
            return;
        }
        if let Err(e) = self.store.remove(key) {
            tracing::warn!(target: TARGET, key = %key, error = %e, "Failed to remove value");
        }
    }
}
