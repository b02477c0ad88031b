use std::{fmt, rc::Rc};

use tessel_auth::AccountKeeper;
use tessel_bank::BankKeeper;
use tessel_primitives::{Address, Coins};
use tessel_sdk::{Context, Event};
use tessel_store::StoreKey;
use tracing::*;

use crate::{
    CallEnv, ContractRuntime, MemPackage, PackageMeta, VmError, VmResult, package_address,
    render_results,
};

const CODE_PREFIX: &[u8] = b"pkg/";
const META_PREFIX: &[u8] = b"vm/pkg/";
const PKG_INDEX_KEY: &[u8] = b"vm/pkgs";

/// Deploys and calls packages.
///
/// Code lives in the base store, metadata and realm state in the main store.
#[derive(Clone)]
pub struct VmKeeper {
    base: StoreKey,
    main: StoreKey,
    accounts: AccountKeeper,
    bank: BankKeeper,
    runtime: Rc<dyn ContractRuntime>,
}

impl fmt::Debug for VmKeeper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VmKeeper")
            .field("base", &self.base)
            .field("main", &self.main)
            .finish_non_exhaustive()
    }
}

impl VmKeeper {
    pub fn new(
        base: StoreKey,
        main: StoreKey,
        accounts: AccountKeeper,
        bank: BankKeeper,
        runtime: Rc<dyn ContractRuntime>,
    ) -> Self {
        Self {
            base,
            main,
            accounts,
            bank,
            runtime,
        }
    }

    /// Checks, after the stores are loaded, that every deployed package can
    /// still be executed by the runtime.
    pub fn initialize(&self, ctx: &Context<'_>) -> VmResult<()> {
        let paths = self.package_index(ctx)?;
        for path in &paths {
            let pkg = self.get_package(ctx, path)?;
            self.runtime
                .check_package(&pkg)
                .map_err(|_| VmError::MissingImplementation(path.clone()))?;
        }
        info!(packages = paths.len(), "vm initialized");
        Ok(())
    }

    /// Returns a deployed package's code.
    pub fn get_package(&self, ctx: &Context<'_>, path: &str) -> VmResult<MemPackage> {
        let raw = ctx
            .get(&self.base, &prefixed(CODE_PREFIX, path))?
            .ok_or_else(|| VmError::PackageNotFound(path.to_owned()))?;
        Ok(borsh::from_slice(&raw)?)
    }

    pub fn get_package_meta(
        &self,
        ctx: &Context<'_>,
        path: &str,
    ) -> VmResult<Option<PackageMeta>> {
        match ctx.get(&self.main, &prefixed(META_PREFIX, path))? {
            Some(raw) => Ok(Some(borsh::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    /// Deploys a package, moving `deposit` from the creator to the package's
    /// account, then runs the package's initialization as the creator.
    pub fn deploy(
        &self,
        ctx: &mut Context<'_>,
        creator: &Address,
        pkg: MemPackage,
        deposit: &Coins,
    ) -> VmResult<String> {
        pkg.validate()?;
        if ctx.has(&self.base, &prefixed(CODE_PREFIX, &pkg.path))? {
            return Err(VmError::PackageExists(pkg.path));
        }
        self.runtime.check_package(&pkg)?;
        self.accounts.must_get(ctx, creator)?;

        let pkg_addr = pkg.address();
        self.accounts.get_or_create(ctx, &pkg_addr)?;
        if !deposit.is_empty() {
            self.bank.send(ctx, creator, &pkg_addr, deposit)?;
        }

        ctx.set(
            &self.base,
            &prefixed(CODE_PREFIX, &pkg.path),
            borsh::to_vec(&pkg)?,
        )?;
        let meta = PackageMeta {
            path: pkg.path.clone(),
            creator: *creator,
            address: pkg_addr,
            deployed_at: ctx.height(),
        };
        ctx.set(
            &self.main,
            &prefixed(META_PREFIX, &pkg.path),
            borsh::to_vec(&meta)?,
        )?;

        let mut index = self.package_index(ctx)?;
        index.push(pkg.path.clone());
        ctx.set(&self.main, PKG_INDEX_KEY, borsh::to_vec(&index)?)?;

        let mut env = CallEnv::new(ctx, &self.main, &pkg, *creator);
        self.runtime.init_package(&mut env, &pkg)?;

        ctx.emit_event(
            Event::new("add_package")
                .attr("creator", creator)
                .attr("pkg_path", &pkg.path),
        );
        debug!(path = %pkg.path, %creator, "deployed package");
        Ok(pkg.path)
    }

    /// Calls a function of a deployed package, returning the textual
    /// rendering of its results.
    ///
    /// `send` is moved from the caller to the package before the call.  A
    /// call with no funds needs no caller account, so read-only queries can
    /// use the zero address.
    pub fn call(
        &self,
        ctx: &mut Context<'_>,
        caller: &Address,
        send: &Coins,
        pkg_path: &str,
        func: &str,
        args: &[String],
    ) -> VmResult<String> {
        let pkg = self.get_package(ctx, pkg_path)?;
        if !send.is_empty() {
            self.bank.send(ctx, caller, &package_address(pkg_path), send)?;
        }

        let mut env = CallEnv::new(ctx, &self.main, &pkg, *caller);
        let values = self
            .runtime
            .call(&mut env, &pkg, func, args)
            .map_err(|source| VmError::Call {
                pkg: pkg_path.to_owned(),
                func: func.to_owned(),
                source,
            })?;

        trace!(%pkg_path, %func, results = values.len(), "called package");
        Ok(render_results(&values))
    }

    fn package_index(&self, ctx: &Context<'_>) -> VmResult<Vec<String>> {
        match ctx.get(&self.main, PKG_INDEX_KEY)? {
            Some(raw) => Ok(borsh::from_slice(&raw)?),
            None => Ok(Vec::new()),
        }
    }
}

fn prefixed(prefix: &[u8], path: &str) -> Vec<u8> {
    let mut key = prefix.to_vec();
    key.extend_from_slice(path.as_bytes());
    key
}
