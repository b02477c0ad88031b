//! Copy-on-write views over a [`StateReader`].

use std::fmt;

use crate::{StateAccess, StateReader, StoreError, StoreKey, StoreResult, WriteBatch};

/// A write-tracking view that wraps a base reader.
///
/// All reads check the write batch first, then fall back to the base.  All
/// writes are recorded in the write batch.  Views nest: a transaction view is
/// a `CacheView` over the block's `CacheView`.  Dropping a view discards its
/// writes, [`CacheView::into_batch`] hands them to the parent.
pub struct CacheView<'base> {
    base: &'base dyn StateReader,
    batch: WriteBatch,
}

impl fmt::Debug for CacheView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheView")
            .field("batch", &self.batch)
            .finish_non_exhaustive()
    }
}

impl<'base> CacheView<'base> {
    /// Creates an empty view over `base`.
    pub fn new(base: &'base dyn StateReader) -> Self {
        Self::with_batch(base, WriteBatch::new())
    }

    /// Creates a view over `base` that already carries `batch`.
    pub fn with_batch(base: &'base dyn StateReader, batch: WriteBatch) -> Self {
        Self { base, batch }
    }

    pub fn batch(&self) -> &WriteBatch {
        &self.batch
    }

    /// Applies a child view's writes to this view.
    pub fn absorb(&mut self, child: WriteBatch) {
        self.batch.merge(child);
    }

    /// Consumes the view and returns the write batch.
    pub fn into_batch(self) -> WriteBatch {
        self.batch
    }

    fn check_mounted(&self, store: &StoreKey) -> StoreResult<()> {
        if self.base.is_mounted(store) {
            Ok(())
        } else {
            Err(StoreError::NotMounted(store.name().to_owned()))
        }
    }
}

impl StateReader for CacheView<'_> {
    fn is_mounted(&self, store: &StoreKey) -> bool {
        self.base.is_mounted(store)
    }

    fn get(&self, store: &StoreKey, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        match self.batch.get(store.name(), key) {
            Some(entry) => Ok(entry.map(<[u8]>::to_vec)),
            None => self.base.get(store, key),
        }
    }
}

impl StateAccess for CacheView<'_> {
    fn set(&mut self, store: &StoreKey, key: &[u8], value: Vec<u8>) -> StoreResult<()> {
        self.check_mounted(store)?;
        self.batch.put(store.name(), key, value);
        Ok(())
    }

    fn delete(&mut self, store: &StoreKey, key: &[u8]) -> StoreResult<()> {
        self.check_mounted(store)?;
        self.batch.delete(store.name(), key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    /// Fixed base state for overlay tests.
    struct FixedState {
        stores: BTreeMap<String, BTreeMap<Vec<u8>, Vec<u8>>>,
    }

    impl FixedState {
        fn new() -> Self {
            let mut main = BTreeMap::new();
            main.insert(b"a".to_vec(), b"base-a".to_vec());
            main.insert(b"b".to_vec(), b"base-b".to_vec());
            let mut stores = BTreeMap::new();
            stores.insert("main".to_owned(), main);
            Self { stores }
        }
    }

    impl StateReader for FixedState {
        fn is_mounted(&self, store: &StoreKey) -> bool {
            self.stores.contains_key(store.name())
        }

        fn get(&self, store: &StoreKey, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
            let s = self
                .stores
                .get(store.name())
                .ok_or_else(|| StoreError::NotMounted(store.name().to_owned()))?;
            Ok(s.get(key).cloned())
        }
    }

    fn main_key() -> StoreKey {
        StoreKey::new("main")
    }

    #[test]
    fn test_reads_fall_through() {
        let base = FixedState::new();
        let view = CacheView::new(&base);
        assert_eq!(view.get(&main_key(), b"a").unwrap(), Some(b"base-a".to_vec()));
        assert_eq!(view.get(&main_key(), b"z").unwrap(), None);
    }

    #[test]
    fn test_writes_shadow_base() {
        let base = FixedState::new();
        let mut view = CacheView::new(&base);
        view.set(&main_key(), b"a", b"new".to_vec()).unwrap();
        view.delete(&main_key(), b"b").unwrap();

        assert_eq!(view.get(&main_key(), b"a").unwrap(), Some(b"new".to_vec()));
        assert!(!view.has(&main_key(), b"b").unwrap());
        assert_eq!(base.get(&main_key(), b"a").unwrap(), Some(b"base-a".to_vec()));
    }

    #[test]
    fn test_nested_view_discard_and_merge() {
        let base = FixedState::new();
        let mut block = CacheView::new(&base);
        block.set(&main_key(), b"c", b"block".to_vec()).unwrap();

        {
            let mut tx = CacheView::new(&block);
            tx.set(&main_key(), b"c", b"discarded".to_vec()).unwrap();
            assert_eq!(tx.get(&main_key(), b"c").unwrap(), Some(b"discarded".to_vec()));
        }
        assert_eq!(block.get(&main_key(), b"c").unwrap(), Some(b"block".to_vec()));

        let mut tx = CacheView::new(&block);
        tx.set(&main_key(), b"d", b"kept".to_vec()).unwrap();
        let child = tx.into_batch();
        block.absorb(child);
        assert_eq!(block.get(&main_key(), b"d").unwrap(), Some(b"kept".to_vec()));
    }

    #[test]
    fn test_write_to_unmounted_store_fails() {
        let base = FixedState::new();
        let mut view = CacheView::new(&base);
        let err = view
            .set(&StoreKey::new("other"), b"k", b"v".to_vec())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotMounted(name) if name == "other"));
    }
}
