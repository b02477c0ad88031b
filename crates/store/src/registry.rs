//! The store registry: mounting, loading and atomic commits.

use std::{
    collections::BTreeMap,
    fmt, fs,
    path::Path,
};

use sled::{
    Transactional,
    transaction::{ConflictableTransactionError, TransactionError},
};
use tessel_primitives::{Buf32, hash};
use tracing::*;

use crate::{
    BackendKind, CommitId, StateReader, StoreError, StoreKey, StoreResult, WriteBatch,
    meta::{self, CommitRecord, LATEST_VERSION_KEY},
};

const META_TREE: &str = "__meta";
const STORE_TREE_PREFIX: &str = "store/";

enum Backend {
    Memory(BTreeMap<Vec<u8>, Vec<u8>>),
    Sled(sled::Tree),
}

struct MountedStore {
    kind: BackendKind,
    backend: Backend,

    /// Leaf hash per key, kept for merkleized stores once loaded.
    leaves: Leaves,
}

/// Owns every mounted store and the version they share.
///
/// Stores are mounted once, then the registry is loaded at its latest
/// version.  From then on state only changes through [`StoreRegistry::commit`],
/// which applies a [`WriteBatch`] to all stores at once and advances the
/// version by one.
pub struct StoreRegistry {
    db: sled::Db,
    meta: sled::Tree,
    stores: BTreeMap<String, MountedStore>,
    loaded: bool,
    last_commit: CommitId,
}

impl fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stores: Vec<_> = self
            .stores
            .iter()
            .map(|(name, s)| (name.as_str(), s.kind))
            .collect();
        f.debug_struct("StoreRegistry")
            .field("stores", &stores)
            .field("loaded", &self.loaded)
            .field("last_commit", &self.last_commit)
            .finish()
    }
}

impl StoreRegistry {
    /// Opens the registry's database under `datadir`, creating it if needed.
    pub fn open(datadir: &Path) -> StoreResult<Self> {
        let mut database_dir = datadir.to_path_buf();
        database_dir.push("sled");
        database_dir.push("tessel");

        if !database_dir.exists() {
            fs::create_dir_all(&database_dir)?;
        }

        let db = sled::open(&database_dir)?;
        Self::from_db(db)
    }

    /// Opens a registry whose database is removed when dropped.
    pub fn open_temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> StoreResult<Self> {
        let meta = db.open_tree(META_TREE)?;
        Ok(Self {
            db,
            meta,
            stores: BTreeMap::new(),
            loaded: false,
            last_commit: CommitId::default(),
        })
    }

    /// Registers a store.  Must be called before [`Self::load_latest`].
    pub fn mount(&mut self, key: &StoreKey, kind: BackendKind) -> StoreResult<()> {
        let name = key.name();
        if self.loaded {
            return Err(StoreError::MountAfterLoad(name.to_owned()));
        }
        if name.is_empty() || name.starts_with("__") {
            return Err(StoreError::InvalidName(name.to_owned()));
        }
        if self.stores.contains_key(name) {
            return Err(StoreError::DuplicateMount(name.to_owned()));
        }

        let backend = if kind.is_durable() {
            Backend::Sled(self.db.open_tree(format!("{STORE_TREE_PREFIX}{name}"))?)
        } else {
            Backend::Memory(BTreeMap::new())
        };

        debug!(store = %name, ?kind, "mounted store");
        self.stores
            .insert(name.to_owned(), MountedStore {
                kind,
                backend,
                leaves: Leaves::new(),
            });
        Ok(())
    }

    /// Opens all mounted stores at the last committed version, checking each
    /// merkleized store against its recorded root.
    pub fn load_latest(&mut self) -> StoreResult<CommitId> {
        if self.loaded {
            return Err(StoreError::AlreadyLoaded);
        }

        let latest = match self.meta.get(LATEST_VERSION_KEY)? {
            Some(raw) => Some(decode_version(&raw)?),
            None => None,
        };

        let record = match latest {
            Some(version) => Some(
                self.read_record(version)?
                    .ok_or(StoreError::MissingCommit(version))?,
            ),
            None => None,
        };

        for (name, store) in &mut self.stores {
            if !store.kind.is_merkle() {
                continue;
            }

            store.leaves = leaf_hashes(&store.backend)?;
            let computed = root_of_leaves(&store.leaves);
            match &record {
                Some(rec) => {
                    let recorded = rec.root_of(name).unwrap_or_else(Buf32::zero);
                    if recorded != computed {
                        return Err(StoreError::RootMismatch {
                            store: name.clone(),
                            version: rec.id.version,
                            recorded,
                            computed,
                        });
                    }
                }
                None if !computed.is_zero() => {
                    return Err(StoreError::MissingMetadata(name.clone()));
                }
                None => {}
            }
        }

        self.last_commit = record.map(|r| r.id).unwrap_or_default();
        self.loaded = true;
        info!(version = self.last_commit.version, hash = %self.last_commit.hash, "loaded stores");
        Ok(self.last_commit)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The id of the last commit, version 0 with a zero hash if none yet.
    pub fn last_commit_id(&self) -> CommitId {
        self.last_commit
    }

    /// Returns the recorded id of a committed version.
    pub fn commit_info(&self, version: u64) -> StoreResult<Option<CommitId>> {
        Ok(self.read_record(version)?.map(|r| r.id))
    }

    /// Applies `batch` to every store in one atomic step and advances the
    /// version by one.  If the write fails no store changes, volatile ones
    /// included.
    pub fn commit(&mut self, batch: WriteBatch) -> StoreResult<CommitId> {
        if !self.loaded {
            return Err(StoreError::NotLoaded);
        }
        for (name, _) in batch.stores() {
            if !self.stores.contains_key(name) {
                return Err(StoreError::NotMounted(name.to_owned()));
            }
        }

        let version = self.last_commit.version + 1;

        let mut roots = Vec::new();
        let mut next_leaves = BTreeMap::new();
        for (name, store) in &self.stores {
            if !store.kind.is_merkle() {
                continue;
            }
            let root = match batch_entries(&batch, name) {
                Some(pending) => {
                    let leaves = projected_leaves(&store.leaves, pending);
                    let root = root_of_leaves(&leaves);
                    next_leaves.insert(name.clone(), leaves);
                    root
                }
                None => root_of_leaves(&store.leaves),
            };
            roots.push((name.clone(), root));
        }
        let id = CommitId {
            version,
            hash: meta::app_hash(&roots),
        };
        let record = CommitRecord { id, roots }.encode()?;

        // The meta tree goes first, followed by every durable store in name
        // order.
        let durable: Vec<&str> = self
            .stores
            .iter()
            .filter(|(_, s)| s.kind.is_durable())
            .map(|(name, _)| name.as_str())
            .collect();
        let mut trees = vec![self.meta.clone()];
        for name in &durable {
            if let Some(Backend::Sled(tree)) = self.stores.get(*name).map(|s| &s.backend) {
                trees.push(tree.clone());
            }
        }

        let res: Result<(), TransactionError<()>> = trees.as_slice().transaction(|txs| {
            let meta_tx = &txs[0];
            for (name, tx_tree) in durable.iter().zip(&txs[1..]) {
                let Some(entries) = batch_entries(&batch, name) else {
                    continue;
                };
                for (key, value) in entries {
                    match value {
                        Some(value) => {
                            tx_tree.insert(key.as_slice(), value.as_slice())?;
                        }
                        None => {
                            tx_tree.remove(key.as_slice())?;
                        }
                    }
                }
            }
            meta_tx.insert(meta::commit_key(version), record.as_slice())?;
            meta_tx.insert(LATEST_VERSION_KEY, &version.to_be_bytes()[..])?;
            Ok::<_, ConflictableTransactionError<()>>(())
        });

        match res {
            Ok(()) => {}
            Err(TransactionError::Storage(e)) => return Err(e.into()),
            Err(TransactionError::Abort(())) => {
                return Err(StoreError::CorruptMetadata("commit aborted".to_owned()));
            }
        }
        self.db.flush()?;

        for (name, leaves) in next_leaves {
            if let Some(store) = self.stores.get_mut(&name) {
                store.leaves = leaves;
            }
        }
        for (name, entries) in batch.stores() {
            if let Some(MountedStore {
                backend: Backend::Memory(map),
                ..
            }) = self.stores.get_mut(name)
            {
                for (key, value) in entries {
                    match value {
                        Some(value) => map.insert(key.clone(), value.clone()),
                        None => map.remove(key),
                    };
                }
            }
        }

        self.last_commit = id;
        debug!(version, hash = %id.hash, writes = batch.len(), "committed stores");
        Ok(id)
    }

    fn read_record(&self, version: u64) -> StoreResult<Option<CommitRecord>> {
        self.meta
            .get(meta::commit_key(version))?
            .map(|raw| CommitRecord::decode(&raw))
            .transpose()
    }

    fn store(&self, key: &StoreKey) -> StoreResult<&MountedStore> {
        self.stores
            .get(key.name())
            .ok_or_else(|| StoreError::NotMounted(key.name().to_owned()))
    }
}

impl StateReader for StoreRegistry {
    fn is_mounted(&self, store: &StoreKey) -> bool {
        self.stores.contains_key(store.name())
    }

    fn get(&self, store: &StoreKey, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        match &self.store(store)?.backend {
            Backend::Memory(map) => Ok(map.get(key).cloned()),
            Backend::Sled(tree) => Ok(tree.get(key)?.map(|v| v.to_vec())),
        }
    }
}

type Entries = BTreeMap<Vec<u8>, Option<Vec<u8>>>;
type Leaves = BTreeMap<Vec<u8>, Buf32>;

fn batch_entries<'b>(batch: &'b WriteBatch, store: &str) -> Option<&'b Entries> {
    batch
        .stores()
        .find(|(name, _)| *name == store)
        .map(|(_, entries)| entries)
}

fn decode_version(raw: &[u8]) -> StoreResult<u64> {
    let arr: [u8; 8] = raw
        .try_into()
        .map_err(|_| StoreError::CorruptMetadata("bad version record".to_owned()))?;
    Ok(u64::from_be_bytes(arr))
}

/// Hashes every entry of a backend.  Only done at load; commits update the
/// cached leaves from the batch instead of rescanning.
fn leaf_hashes(backend: &Backend) -> StoreResult<Leaves> {
    match backend {
        Backend::Memory(map) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), hash::kv_leaf(k, v)))
            .collect()),
        Backend::Sled(tree) => tree
            .iter()
            .map(|kv| -> StoreResult<(Vec<u8>, Buf32)> {
                let (k, v) = kv?;
                Ok((k.to_vec(), hash::kv_leaf(&k, &v)))
            })
            .collect(),
    }
}

/// Leaves the store would have after applying `pending`.
fn projected_leaves(leaves: &Leaves, pending: &Entries) -> Leaves {
    let mut next = leaves.clone();
    for (key, value) in pending {
        match value {
            Some(value) => next.insert(key.clone(), hash::kv_leaf(key, value)),
            None => next.remove(key),
        };
    }
    next
}

/// Combining the leaves stays linear in the number of keys; only changed
/// entries are hashed again.
fn root_of_leaves(leaves: &Leaves) -> Buf32 {
    let ordered: Vec<Buf32> = leaves.values().copied().collect();
    hash::merkle_root(&ordered)
}

#[cfg(test)]
mod tests {
    use crate::{CacheView, StateAccess};

    use super::*;

    fn main_key() -> StoreKey {
        StoreKey::new("main")
    }

    fn base_key() -> StoreKey {
        StoreKey::new("base")
    }

    fn mem_key() -> StoreKey {
        StoreKey::new("mem")
    }

    fn mounted(reg: &mut StoreRegistry) {
        reg.mount(&main_key(), BackendKind::Merkle).unwrap();
        reg.mount(&base_key(), BackendKind::Durable).unwrap();
        reg.mount(&mem_key(), BackendKind::Memory).unwrap();
    }

    fn temp_registry() -> StoreRegistry {
        let mut reg = StoreRegistry::open_temporary().unwrap();
        mounted(&mut reg);
        reg.load_latest().unwrap();
        reg
    }

    fn write(reg: &StoreRegistry, store: &StoreKey, key: &[u8], value: &[u8]) -> WriteBatch {
        let mut view = CacheView::new(reg);
        view.set(store, key, value.to_vec()).unwrap();
        view.into_batch()
    }

    #[test]
    fn test_duplicate_mount_fails() {
        let mut reg = StoreRegistry::open_temporary().unwrap();
        reg.mount(&main_key(), BackendKind::Merkle).unwrap();
        assert!(matches!(
            reg.mount(&main_key(), BackendKind::Memory),
            Err(StoreError::DuplicateMount(_))
        ));
    }

    #[test]
    fn test_mount_after_load_fails() {
        let mut reg = temp_registry();
        assert!(matches!(
            reg.mount(&StoreKey::new("late"), BackendKind::Memory),
            Err(StoreError::MountAfterLoad(_))
        ));
    }

    #[test]
    fn test_reserved_name_rejected() {
        let mut reg = StoreRegistry::open_temporary().unwrap();
        assert!(matches!(
            reg.mount(&StoreKey::new("__meta"), BackendKind::Durable),
            Err(StoreError::InvalidName(_))
        ));
    }

    #[test]
    fn test_commit_requires_load() {
        let mut reg = StoreRegistry::open_temporary().unwrap();
        mounted(&mut reg);
        assert!(matches!(
            reg.commit(WriteBatch::new()),
            Err(StoreError::NotLoaded)
        ));
    }

    #[test]
    fn test_commit_advances_version_by_one() {
        let mut reg = temp_registry();
        assert_eq!(reg.last_commit_id().version, 0);

        for i in 1..=5u64 {
            let batch = write(&reg, &main_key(), &i.to_be_bytes(), b"v");
            let id = reg.commit(batch).unwrap();
            assert_eq!(id.version, i);
            assert_eq!(reg.commit_info(i).unwrap(), Some(id));
        }

        let empty = reg.commit(WriteBatch::new()).unwrap();
        assert_eq!(empty.version, 6);
        assert_eq!(empty.hash, reg.commit_info(5).unwrap().unwrap().hash);
    }

    #[test]
    fn test_identical_writes_give_identical_hashes() {
        let mut a = temp_registry();
        let mut b = temp_registry();
        for (k, v) in [
            (&b"x"[..], &b"1"[..]),
            (&b"y"[..], &b"2"[..]),
            (&b"x"[..], &b"3"[..]),
        ] {
            let ha = a.commit(write(&a, &main_key(), k, v)).unwrap();
            let hb = b.commit(write(&b, &main_key(), k, v)).unwrap();
            assert_eq!(ha, hb);
        }
    }

    #[test]
    fn test_only_merkle_stores_affect_hash() {
        let mut a = temp_registry();
        let mut b = temp_registry();
        let ha = a.commit(write(&a, &base_key(), b"code", b"1")).unwrap();
        let hb = b.commit(write(&b, &mem_key(), b"tmp", b"1")).unwrap();
        assert_eq!(ha.hash, Buf32::zero());
        assert_eq!(ha, hb);

        let hm = a.commit(write(&a, &main_key(), b"k", b"v")).unwrap();
        assert_ne!(hm.hash, Buf32::zero());
    }

    #[test]
    fn test_commit_unmounted_store_fails() {
        let mut reg = temp_registry();
        let mut batch = WriteBatch::new();
        batch.put("nope", b"k", b"v".to_vec());
        assert!(matches!(
            reg.commit(batch),
            Err(StoreError::NotMounted(_))
        ));
        assert_eq!(reg.last_commit_id().version, 0);
    }

    #[test]
    fn test_reopen_persists_durable_and_drops_memory() {
        let dir = tempfile::tempdir().unwrap();

        let id = {
            let mut reg = StoreRegistry::open(dir.path()).unwrap();
            mounted(&mut reg);
            reg.load_latest().unwrap();

            let mut view = CacheView::new(&reg);
            view.set(&main_key(), b"k", b"v".to_vec()).unwrap();
            view.set(&base_key(), b"code", b"c".to_vec()).unwrap();
            view.set(&mem_key(), b"tmp", b"t".to_vec()).unwrap();
            let batch = view.into_batch();
            let id = reg.commit(batch).unwrap();
            assert_eq!(reg.get(&mem_key(), b"tmp").unwrap(), Some(b"t".to_vec()));
            id
        };

        let mut reg = StoreRegistry::open(dir.path()).unwrap();
        mounted(&mut reg);
        assert_eq!(reg.load_latest().unwrap(), id);
        assert_eq!(reg.get(&main_key(), b"k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(reg.get(&base_key(), b"code").unwrap(), Some(b"c".to_vec()));
        assert_eq!(reg.get(&mem_key(), b"tmp").unwrap(), None);
    }

    #[test]
    fn test_cached_leaves_match_rescan_on_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let id = {
            let mut reg = StoreRegistry::open(dir.path()).unwrap();
            mounted(&mut reg);
            assert!(!reg.is_loaded());
            reg.load_latest().unwrap();
            assert!(reg.is_loaded());

            for i in 0..4u8 {
                let batch = write(&reg, &main_key(), &[i], &[i; 3]);
                reg.commit(batch).unwrap();
            }

            let mut view = CacheView::new(&reg);
            view.set(&main_key(), &[1], b"changed".to_vec()).unwrap();
            view.delete(&main_key(), &[2]).unwrap();
            let batch = view.into_batch();
            reg.commit(batch).unwrap()
        };

        // Loading hashes every stored entry again and checks the recorded
        // root.
        let mut reg = StoreRegistry::open(dir.path()).unwrap();
        mounted(&mut reg);
        assert_eq!(reg.load_latest().unwrap(), id);

        let next = reg.commit(write(&reg, &main_key(), &[9], b"v")).unwrap();
        assert_eq!(next.version, id.version + 1);
        assert_ne!(next.hash, id.hash);
    }

    #[test]
    fn test_tampered_store_fails_load() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut reg = StoreRegistry::open(dir.path()).unwrap();
            mounted(&mut reg);
            reg.load_latest().unwrap();
            let batch = write(&reg, &main_key(), b"k", b"v");
            reg.commit(batch).unwrap();
        }

        {
            let db = sled::open(dir.path().join("sled").join("tessel")).unwrap();
            let tree = db.open_tree("store/main").unwrap();
            tree.insert(b"k", &b"forged"[..]).unwrap();
            db.flush().unwrap();
        }

        let mut reg = StoreRegistry::open(dir.path()).unwrap();
        mounted(&mut reg);
        assert!(matches!(
            reg.load_latest(),
            Err(StoreError::RootMismatch { version: 1, .. })
        ));
    }

    #[test]
    fn test_data_without_metadata_fails_load() {
        let dir = tempfile::tempdir().unwrap();

        {
            let db = sled::open(dir.path().join("sled").join("tessel")).unwrap();
            let tree = db.open_tree("store/main").unwrap();
            tree.insert(b"k", &b"v"[..]).unwrap();
            db.flush().unwrap();
        }

        let mut reg = StoreRegistry::open(dir.path()).unwrap();
        mounted(&mut reg);
        assert!(matches!(
            reg.load_latest(),
            Err(StoreError::MissingMetadata(_))
        ));
    }
}
