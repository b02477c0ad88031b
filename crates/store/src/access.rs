//! Read and write access traits over store state.

use crate::{StoreKey, StoreResult};

/// Read access to one or more stores.
pub trait StateReader {
    /// Returns if a store with this key is mounted.
    fn is_mounted(&self, store: &StoreKey) -> bool;

    /// Gets a value, `None` if absent.
    fn get(&self, store: &StoreKey, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    fn has(&self, store: &StoreKey, key: &[u8]) -> StoreResult<bool> {
        Ok(self.get(store, key)?.is_some())
    }
}

/// Read/write access.  Writes are only ever buffered.
pub trait StateAccess: StateReader {
    fn set(&mut self, store: &StoreKey, key: &[u8], value: Vec<u8>) -> StoreResult<()>;

    fn delete(&mut self, store: &StoreKey, key: &[u8]) -> StoreResult<()>;
}
