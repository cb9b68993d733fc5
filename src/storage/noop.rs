use crate::error::Result;
use crate::traits::store::KeyValueStore;

/// Store for contexts without durable storage
///
/// Reports itself unavailable. Reads find nothing and writes are discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpStore;

impl KeyValueStore for NoOpStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    fn is_available(&self) -> bool {
        false
    }
}
