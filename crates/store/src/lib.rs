//! Named, versioned state stores and the copy-on-write views used to mutate
//! them.
//!
//! A [`StoreRegistry`] owns every mounted store.  Execution never writes to it
//! directly: blocks and transactions work on [`CacheView`]s whose
//! [`WriteBatch`]es are handed back to [`StoreRegistry::commit`].

mod access;
mod batch;
mod cache;
mod errors;
mod key;
mod meta;
mod registry;

pub use access::{StateAccess, StateReader};
pub use batch::WriteBatch;
pub use cache::CacheView;
pub use errors::{StoreError, StoreResult};
pub use key::{BackendKind, StoreKey};
pub use meta::CommitId;
pub use registry::StoreRegistry;
