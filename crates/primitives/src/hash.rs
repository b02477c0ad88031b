//! Common wrapper around whatever we choose our native hash function to be,
//! plus the binary merkle construction used for store roots.

use sha2::{Digest, Sha256};

use crate::buf::Buf32;

/// Domain tag for leaf hashes.
const LEAF_TAG: u8 = 0x00;

/// Domain tag for interior node hashes.
const NODE_TAG: u8 = 0x01;

/// Direct untagged hash.
pub fn raw(buf: &[u8]) -> Buf32 {
    Buf32::new(Sha256::digest(buf).into())
}

/// Hashes a key/value pair into a merkle leaf.
///
/// Both parts are length-prefixed so different splits of the same bytes never
/// collide.
pub fn kv_leaf(key: &[u8], value: &[u8]) -> Buf32 {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_TAG]);
    hasher.update((key.len() as u64).to_be_bytes());
    hasher.update(key);
    hasher.update((value.len() as u64).to_be_bytes());
    hasher.update(value);
    Buf32::new(hasher.finalize().into())
}

fn node(left: &Buf32, right: &Buf32) -> Buf32 {
    let mut hasher = Sha256::new();
    hasher.update([NODE_TAG]);
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Buf32::new(hasher.finalize().into())
}

/// Computes the merkle root over an ordered list of leaf hashes.
///
/// An odd node at the end of a level is carried up unchanged.  The root of an
/// empty list is the zero hash.
pub fn merkle_root(leaves: &[Buf32]) -> Buf32 {
    if leaves.is_empty() {
        return Buf32::zero();
    }

    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [a, b] => node(a, b),
                [a] => *a,
                _ => unreachable!("hash: chunk of two"),
            })
            .collect();
    }

    level[0]
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_empty_root_is_zero() {
        assert_eq!(merkle_root(&[]), Buf32::zero());
    }

    #[test]
    fn test_single_leaf_root_is_leaf() {
        let leaf = kv_leaf(b"k", b"v");
        assert_eq!(merkle_root(&[leaf]), leaf);
    }

    #[test]
    fn test_leaf_split_does_not_collide() {
        assert_ne!(kv_leaf(b"ab", b"c"), kv_leaf(b"a", b"bc"));
    }

    #[test]
    fn test_odd_leaf_is_carried() {
        let a = kv_leaf(b"a", b"1");
        let b = kv_leaf(b"b", b"2");
        let c = kv_leaf(b"c", b"3");
        assert_eq!(merkle_root(&[a, b, c]), node(&node(&a, &b), &c));
    }

    proptest! {
        #[test]
        fn proptest_root_changes_with_any_value(
            values in proptest::collection::vec(any::<u8>(), 1..32),
            idx in any::<prop::sample::Index>(),
        ) {
            let leaves: Vec<_> = values
                .iter()
                .enumerate()
                .map(|(i, v)| kv_leaf(&[i as u8], &[*v]))
                .collect();
            let root = merkle_root(&leaves);

            let i = idx.index(values.len());
            let mut tweaked = leaves.clone();
            tweaked[i] = kv_leaf(&[i as u8], &[values[i].wrapping_add(1)]);
            prop_assert_ne!(root, merkle_root(&tweaked));
        }
    }
}
