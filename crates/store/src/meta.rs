//! Commit metadata kept next to the stores.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tessel_primitives::{Buf32, hash};

use crate::{StoreError, StoreResult};

/// Key of the latest committed version in the meta tree.
pub(crate) const LATEST_VERSION_KEY: &[u8] = b"latest";

/// Identifies a commit: the version and the app hash it produced.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct CommitId {
    pub version: u64,
    pub hash: Buf32,
}

/// What the registry records per committed version.
#[derive(Clone, Debug, Eq, PartialEq, BorshSerialize, BorshDeserialize)]
pub(crate) struct CommitRecord {
    pub(crate) id: CommitId,

    /// Root of every merkleized store, sorted by name.
    pub(crate) roots: Vec<(String, Buf32)>,
}

impl CommitRecord {
    pub(crate) fn root_of(&self, store: &str) -> Option<Buf32> {
        self.roots
            .iter()
            .find(|(name, _)| name == store)
            .map(|(_, root)| *root)
    }

    pub(crate) fn encode(&self) -> StoreResult<Vec<u8>> {
        borsh::to_vec(self).map_err(StoreError::Io)
    }

    pub(crate) fn decode(buf: &[u8]) -> StoreResult<Self> {
        borsh::from_slice(buf).map_err(|e| StoreError::CorruptMetadata(e.to_string()))
    }
}

pub(crate) fn commit_key(version: u64) -> Vec<u8> {
    let mut key = b"commit/".to_vec();
    key.extend_from_slice(&version.to_be_bytes());
    key
}

/// App hash over `(name, root)` pairs already sorted by name.
pub(crate) fn app_hash(roots: &[(String, Buf32)]) -> Buf32 {
    let leaves: Vec<_> = roots
        .iter()
        .map(|(name, root)| hash::kv_leaf(name.as_bytes(), root.as_bytes()))
        .collect();
    hash::merkle_root(&leaves)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_roundtrip() {
        let rec = CommitRecord {
            id: CommitId {
                version: 3,
                hash: Buf32::new([1; 32]),
            },
            roots: vec![("main".to_owned(), Buf32::new([2; 32]))],
        };
        let decoded = CommitRecord::decode(&rec.encode().unwrap()).unwrap();
        assert_eq!(decoded, rec);
        assert_eq!(decoded.root_of("main"), Some(Buf32::new([2; 32])));
        assert_eq!(decoded.root_of("base"), None);
    }

    #[test]
    fn test_commit_keys_sort_by_version() {
        assert!(commit_key(9) < commit_key(10));
        assert!(commit_key(255) < commit_key(256));
    }

    #[test]
    fn test_empty_app_hash_is_zero() {
        assert_eq!(app_hash(&[]), Buf32::zero());
    }
}
