use std::fmt;

/// Which backend a store lives on.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BackendKind {
    /// Volatile, in process memory.  Lost on restart, never part of the app
    /// hash.
    Memory,

    /// Durable but not merkleized.
    Durable,

    /// Durable and merkleized.  Contributes to the app hash.
    Merkle,
}

impl BackendKind {
    pub fn is_durable(&self) -> bool {
        !matches!(self, BackendKind::Memory)
    }

    pub fn is_merkle(&self) -> bool {
        matches!(self, BackendKind::Merkle)
    }
}

/// Capability to address a mounted store.
///
/// Keepers are constructed with the keys of the stores they may touch and
/// nothing else.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StoreKey(String);

impl StoreKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
