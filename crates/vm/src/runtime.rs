//! The seam between the keeper and whatever executes package code.

use tessel_primitives::Address;
use tessel_sdk::{Context, Event};
use tessel_store::StoreKey;

use crate::{MemPackage, RuntimeError, TypedValue};

/// Executes package code.
pub trait ContractRuntime {
    /// Checks that the runtime can execute a package before it is deployed.
    fn check_package(&self, pkg: &MemPackage) -> Result<(), RuntimeError>;

    /// Runs a package's initialization right after it is deployed.
    fn init_package(
        &self,
        env: &mut CallEnv<'_, '_>,
        pkg: &MemPackage,
    ) -> Result<(), RuntimeError>;

    /// Calls an exported function of a deployed package.
    fn call(
        &self,
        env: &mut CallEnv<'_, '_>,
        pkg: &MemPackage,
        func: &str,
        args: &[String],
    ) -> Result<Vec<TypedValue>, RuntimeError>;
}

/// What package code sees of the chain during a call.
///
/// Realm state is scoped to the package: keys are prefixed with the package
/// path, so a package can never read or write another package's state.
#[derive(Debug)]
pub struct CallEnv<'c, 'a> {
    ctx: &'c mut Context<'a>,
    store: &'c StoreKey,
    pkg_path: &'c str,
    caller: Address,
}

impl<'c, 'a> CallEnv<'c, 'a> {
    pub(crate) fn new(
        ctx: &'c mut Context<'a>,
        store: &'c StoreKey,
        pkg: &'c MemPackage,
        caller: Address,
    ) -> Self {
        Self {
            ctx,
            store,
            pkg_path: &pkg.path,
            caller,
        }
    }

    pub fn caller(&self) -> Address {
        self.caller
    }

    pub fn pkg_path(&self) -> &str {
        self.pkg_path
    }

    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RuntimeError> {
        Ok(self.ctx.get(self.store, &self.realm_key(key))?)
    }

    pub fn set(&mut self, key: &str, value: Vec<u8>) -> Result<(), RuntimeError> {
        let full = self.realm_key(key);
        Ok(self.ctx.set(self.store, &full, value)?)
    }

    /// Emits an event tagged with the package path.
    pub fn emit_event(&mut self, event: Event) {
        self.ctx
            .emit_event(event.attr("pkg_path", self.pkg_path));
    }

    fn realm_key(&self, key: &str) -> Vec<u8> {
        let mut out = b"realm/".to_vec();
        out.extend_from_slice(self.pkg_path.as_bytes());
        out.push(0);
        out.extend_from_slice(key.as_bytes());
        out
    }
}
