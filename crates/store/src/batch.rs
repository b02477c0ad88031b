use std::collections::BTreeMap;

/// Buffered writes, per store name.  `None` is a deletion.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WriteBatch {
    stores: BTreeMap<String, BTreeMap<Vec<u8>, Option<Vec<u8>>>>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.values().all(|s| s.is_empty())
    }

    /// Number of buffered entries across all stores.
    pub fn len(&self) -> usize {
        self.stores.values().map(|s| s.len()).sum()
    }

    /// Looks up a buffered entry.  The outer `None` means "not touched", the
    /// inner one means "deleted".
    pub fn get(&self, store: &str, key: &[u8]) -> Option<Option<&[u8]>> {
        self.stores
            .get(store)?
            .get(key)
            .map(|v| v.as_deref())
    }

    pub fn put(&mut self, store: &str, key: &[u8], value: Vec<u8>) {
        self.entry(store).insert(key.to_vec(), Some(value));
    }

    pub fn delete(&mut self, store: &str, key: &[u8]) {
        self.entry(store).insert(key.to_vec(), None);
    }

    /// Applies `other` on top of this batch.  Entries of `other` win.
    pub fn merge(&mut self, other: WriteBatch) {
        for (store, entries) in other.stores {
            self.entry(&store).extend(entries);
        }
    }

    /// Iterates the touched stores and their entries.
    pub fn stores(&self) -> impl Iterator<Item = (&str, &BTreeMap<Vec<u8>, Option<Vec<u8>>>)> {
        self.stores.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn entry(&mut self, store: &str) -> &mut BTreeMap<Vec<u8>, Option<Vec<u8>>> {
        self.stores.entry(store.to_owned()).or_default()
    }
}
