//! The validator registry realm.
//!
//! Keeps the validator set the chain reports to consensus.  The deployer of
//! the realm becomes its admin and is the only caller allowed to change the
//! set.  `ValidatorSet` returns the set as a JSON string.

use serde::{Deserialize, Serialize};
use tessel_primitives::{Address, PubKeyEd25519};
use tessel_sdk::Event;
use tracing::*;

use crate::{CallEnv, NativePackage, RuntimeError, TypedValue};

/// Well-known path of the validator registry.
pub const VALIDATORS_PKG_PATH: &str = "gno.land/r/validators";

const ADMIN_KEY: &str = "admin";
const VALSET_KEY: &str = "valset";

/// One entry of the set, as serialized in the `ValidatorSet` result.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ValidatorEntry {
    pub address: Address,
    pub pubkey: PubKeyEd25519,
    pub vp: i64,
}

/// Native implementation of the validator registry realm.
#[derive(Copy, Clone, Debug, Default)]
pub struct ValidatorsRealm;

impl ValidatorsRealm {
    fn admin(env: &CallEnv<'_, '_>) -> Result<Address, RuntimeError> {
        let raw = env
            .get(ADMIN_KEY)?
            .ok_or_else(|| RuntimeError::State("admin not set".to_owned()))?;
        Address::from_slice(&raw).map_err(|e| RuntimeError::State(e.to_string()))
    }

    fn ensure_admin(env: &CallEnv<'_, '_>) -> Result<(), RuntimeError> {
        let caller = env.caller();
        if Self::admin(env)? != caller {
            return Err(RuntimeError::Unauthorized(caller));
        }
        Ok(())
    }

    fn load(env: &CallEnv<'_, '_>) -> Result<Vec<ValidatorEntry>, RuntimeError> {
        match env.get(VALSET_KEY)? {
            Some(raw) => {
                serde_json::from_slice(&raw).map_err(|e| RuntimeError::State(e.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    fn store(env: &mut CallEnv<'_, '_>, set: &[ValidatorEntry]) -> Result<(), RuntimeError> {
        let raw = serde_json::to_vec(set).map_err(|e| RuntimeError::State(e.to_string()))?;
        env.set(VALSET_KEY, raw)
    }

    fn add_validator(env: &mut CallEnv<'_, '_>, args: &[String]) -> Result<(), RuntimeError> {
        let [pubkey, power] = args else {
            return Err(RuntimeError::InvalidArgs(
                "AddValidator(pubkey, power)".to_owned(),
            ));
        };
        Self::ensure_admin(env)?;

        let pubkey = parse_pubkey(pubkey)?;
        let vp: i64 = power
            .parse()
            .map_err(|_| RuntimeError::InvalidArgs(format!("bad power '{power}'")))?;
        if vp <= 0 {
            return Err(RuntimeError::InvalidArgs(format!(
                "power must be positive, got {vp}"
            )));
        }

        let mut set = Self::load(env)?;
        match set.iter_mut().find(|e| e.pubkey == pubkey) {
            Some(entry) => entry.vp = vp,
            None => set.push(ValidatorEntry {
                address: pubkey.address(),
                pubkey,
                vp,
            }),
        }
        Self::store(env, &set)?;
        env.emit_event(
            Event::new("validator_added")
                .attr("address", pubkey.address())
                .attr("power", vp),
        );

        debug!(address = %pubkey.address(), vp, "validator added");
        Ok(())
    }

    fn remove_validator(env: &mut CallEnv<'_, '_>, args: &[String]) -> Result<(), RuntimeError> {
        let [pubkey] = args else {
            return Err(RuntimeError::InvalidArgs(
                "RemoveValidator(pubkey)".to_owned(),
            ));
        };
        Self::ensure_admin(env)?;

        let pubkey = parse_pubkey(pubkey)?;
        let mut set = Self::load(env)?;
        let entry = set
            .iter_mut()
            .find(|e| e.pubkey == pubkey)
            .ok_or_else(|| RuntimeError::InvalidArgs(format!("unknown validator {pubkey}")))?;

        // Kept with zero power so consensus learns about the removal.
        entry.vp = 0;
        Self::store(env, &set)?;
        env.emit_event(Event::new("validator_removed").attr("address", pubkey.address()));

        debug!(address = %pubkey.address(), "validator removed");
        Ok(())
    }
}

fn parse_pubkey(s: &str) -> Result<PubKeyEd25519, RuntimeError> {
    PubKeyEd25519::from_base64(s).map_err(|e| RuntimeError::InvalidArgs(e.to_string()))
}

impl NativePackage for ValidatorsRealm {
    fn init(&self, env: &mut CallEnv<'_, '_>) -> Result<(), RuntimeError> {
        let admin = env.caller();
        env.set(ADMIN_KEY, admin.as_bytes().to_vec())?;
        Self::store(env, &[])
    }

    fn call(
        &self,
        env: &mut CallEnv<'_, '_>,
        func: &str,
        args: &[String],
    ) -> Result<Vec<TypedValue>, RuntimeError> {
        match func {
            "AddValidator" => Self::add_validator(env, args).map(|_| Vec::new()),
            "RemoveValidator" => Self::remove_validator(env, args).map(|_| Vec::new()),
            "ValidatorSet" => {
                let set = Self::load(env)?;
                let json =
                    serde_json::to_string(&set).map_err(|e| RuntimeError::State(e.to_string()))?;
                Ok(vec![TypedValue::String(json)])
            }
            _ => Err(RuntimeError::UnknownFunction {
                pkg: env.pkg_path().to_owned(),
                func: func.to_owned(),
            }),
        }
    }
}
