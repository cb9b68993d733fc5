//! Key-value store trait for durable client-side state
//!
//! This trait abstracts the string-keyed store that the persistence adapter
//! writes to, allowing users to swap between in-memory, file-backed, or custom
//! implementations (for example a browser `localStorage` bridge).

use crate::error::Result;
use std::sync::Arc;

/// Durable string-keyed store
///
/// Values are opaque strings; encoding is the caller's concern. All operations
/// are synchronous and complete before returning.
pub trait KeyValueStore: Send + Sync {
    /// Get the raw value stored under `key`
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the value stored under `key`
    ///
    /// Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Whether the store can be used at all in this execution context
    ///
    /// A store that reports `false` is skipped entirely by the persistence
    /// adapter.
    fn is_available(&self) -> bool {
        true
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}
