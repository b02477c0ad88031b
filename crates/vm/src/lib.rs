//! Contract packages: deployment, invocation and the runtime seam.
//!
//! The keeper stores package code in the base store and package metadata and
//! realm state in the main store.  Execution itself is delegated to a
//! [`ContractRuntime`].  The runtime shipped here, [`NativeRuntime`], runs
//! packages implemented in Rust; it does not interpret contract code.

mod errors;
mod handler;
mod keeper;
mod msgs;
mod native;
mod package;
mod runtime;
mod validators;
mod value;

pub use errors::{RuntimeError, VmError, VmResult};
pub use handler::VmHandler;
pub use keeper::VmKeeper;
pub use msgs::{MsgAddPackage, MsgCall};
pub use native::{NativePackage, NativeRuntime};
pub use package::{LIBRARY_PREFIX, MemFile, MemPackage, PackageMeta, REALM_PREFIX, package_address};
pub use runtime::{CallEnv, ContractRuntime};
pub use validators::{VALIDATORS_PKG_PATH, ValidatorEntry, ValidatorsRealm};
pub use value::{TypedValue, render_results};

/// Route of vm messages.
pub const ROUTE: &str = "vm";
