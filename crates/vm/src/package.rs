//! Packages as they are deployed and stored.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tessel_primitives::Address;

use crate::VmError;

/// Path prefix of stateful packages (realms).
pub const REALM_PREFIX: &str = "gno.land/r/";

/// Path prefix of stateless library packages.
pub const LIBRARY_PREFIX: &str = "gno.land/p/";

#[derive(
    Clone, Debug, Eq, PartialEq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct MemFile {
    pub name: String,
    pub body: String,
}

/// A package: its name, import path and source files.
#[derive(
    Clone, Debug, Eq, PartialEq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct MemPackage {
    pub name: String,
    pub path: String,
    pub files: Vec<MemFile>,
}

impl MemPackage {
    /// Checks the path shape, the name and that files are present and
    /// uniquely named.
    pub fn validate(&self) -> Result<(), VmError> {
        let rest = self
            .path
            .strip_prefix(REALM_PREFIX)
            .or_else(|| self.path.strip_prefix(LIBRARY_PREFIX))
            .ok_or_else(|| VmError::InvalidPackage(format!("bad path '{}'", self.path)))?;

        let path_ok = !rest.is_empty()
            && rest.split('/').all(|seg| {
                !seg.is_empty()
                    && seg
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            });
        if !path_ok {
            return Err(VmError::InvalidPackage(format!("bad path '{}'", self.path)));
        }

        let last = rest.rsplit('/').next().unwrap_or_default();
        if self.name != last {
            return Err(VmError::InvalidPackage(format!(
                "name '{}' does not match path '{}'",
                self.name, self.path
            )));
        }

        if self.files.is_empty() {
            return Err(VmError::InvalidPackage("no files".to_owned()));
        }
        for (i, f) in self.files.iter().enumerate() {
            if f.name.is_empty() || self.files[..i].iter().any(|g| g.name == f.name) {
                return Err(VmError::InvalidPackage(format!("bad file name '{}'", f.name)));
            }
        }

        Ok(())
    }

    pub fn is_realm(&self) -> bool {
        self.path.starts_with(REALM_PREFIX)
    }

    pub fn address(&self) -> Address {
        package_address(&self.path)
    }
}

/// The account owned by a package.
pub fn package_address(path: &str) -> Address {
    Address::derive_module("pkg", path)
}

/// What the main store records about a deployed package.
#[derive(Clone, Debug, Eq, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct PackageMeta {
    pub path: String,
    pub creator: Address,
    pub address: Address,
    pub deployed_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(name: &str, path: &str) -> MemPackage {
        MemPackage {
            name: name.to_owned(),
            path: path.to_owned(),
            files: vec![MemFile {
                name: format!("{name}.gno"),
                body: format!("package {name}"),
            }],
        }
    }

    #[test]
    fn test_valid_paths() {
        pkg("validators", "gno.land/r/validators").validate().unwrap();
        pkg("avl", "gno.land/p/demo/avl").validate().unwrap();
        assert!(pkg("validators", "gno.land/r/validators").is_realm());
        assert!(!pkg("avl", "gno.land/p/demo/avl").is_realm());
    }

    #[test]
    fn test_invalid_packages() {
        assert!(pkg("x", "example.com/x").validate().is_err());
        assert!(pkg("x", "gno.land/r/").validate().is_err());
        assert!(pkg("x", "gno.land/r/a//x").validate().is_err());
        assert!(pkg("X", "gno.land/r/X").validate().is_err());
        assert!(pkg("y", "gno.land/r/x").validate().is_err());

        let mut dup = pkg("x", "gno.land/r/x");
        dup.files.push(dup.files[0].clone());
        assert!(dup.validate().is_err());

        let mut empty = pkg("x", "gno.land/r/x");
        empty.files.clear();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_addresses_differ_by_path() {
        assert_ne!(
            package_address("gno.land/r/a"),
            package_address("gno.land/r/b")
        );
    }
}
