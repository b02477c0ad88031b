//! Runtime for packages implemented in Rust.

use std::{collections::BTreeMap, fmt, rc::Rc};

use crate::{CallEnv, ContractRuntime, MemPackage, RuntimeError, TypedValue};

/// A package whose behavior is implemented natively.
pub trait NativePackage {
    /// Runs once, when the package is deployed.
    fn init(&self, _env: &mut CallEnv<'_, '_>) -> Result<(), RuntimeError> {
        Ok(())
    }

    fn call(
        &self,
        env: &mut CallEnv<'_, '_>,
        func: &str,
        args: &[String],
    ) -> Result<Vec<TypedValue>, RuntimeError>;
}

/// Dispatches calls to native packages registered by path.
///
/// Deploying a package at a registered path stores its files as usual; the
/// files are not executed, the registered implementation is.
#[derive(Clone, Default)]
pub struct NativeRuntime {
    packages: BTreeMap<String, Rc<dyn NativePackage>>,
}

impl fmt::Debug for NativeRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeRuntime")
            .field("packages", &self.packages.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl NativeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the implementation backing a package path, replacing any
    /// previous one.
    pub fn register(&mut self, path: impl Into<String>, pkg: impl NativePackage + 'static) {
        self.packages.insert(path.into(), Rc::new(pkg));
    }

    pub fn with_package(
        mut self,
        path: impl Into<String>,
        pkg: impl NativePackage + 'static,
    ) -> Self {
        self.register(path, pkg);
        self
    }

    fn resolve(&self, path: &str) -> Result<&Rc<dyn NativePackage>, RuntimeError> {
        self.packages
            .get(path)
            .ok_or_else(|| RuntimeError::UnknownPackage(path.to_owned()))
    }
}

impl ContractRuntime for NativeRuntime {
    fn check_package(&self, pkg: &MemPackage) -> Result<(), RuntimeError> {
        self.resolve(&pkg.path).map(|_| ())
    }

    fn init_package(
        &self,
        env: &mut CallEnv<'_, '_>,
        pkg: &MemPackage,
    ) -> Result<(), RuntimeError> {
        self.resolve(&pkg.path)?.init(env)
    }

    fn call(
        &self,
        env: &mut CallEnv<'_, '_>,
        pkg: &MemPackage,
        func: &str,
        args: &[String],
    ) -> Result<Vec<TypedValue>, RuntimeError> {
        self.resolve(&pkg.path)?.call(env, func, args)
    }
}
