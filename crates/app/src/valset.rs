//! Validator sets read from the validator registry contract.
//!
//! The contract returns the set as a single string result, rendered by the
//! vm as `("<escaped json>" string)`.  [`decode_validator_set`] accepts only
//! that shape.

use serde::{Deserialize, Serialize};
use tessel_primitives::{Address, Coins, PubKeyEd25519};
use tessel_sdk::Context;
use tessel_vm::VmKeeper;
use tracing::*;

use crate::ValsetError;

const RESULT_PREFIX: &str = "(\"";
const RESULT_SUFFIX: &str = "\" string)";

/// A validator and its voting power as reported to consensus.  Power 0
/// removes the validator.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ValidatorUpdate {
    pub address: Address,
    pub pub_key: PubKeyEd25519,
    pub power: i64,
}

#[derive(Deserialize)]
struct RawValidator {
    pubkey: String,
    vp: i64,
}

/// Decodes the rendered result of the validator-set query.
///
/// The address reported by the contract is ignored and derived again from the
/// public key.  Order is kept as returned.
pub fn decode_validator_set(text: &str) -> Result<Vec<ValidatorUpdate>, ValsetError> {
    let inner = text
        .strip_prefix(RESULT_PREFIX)
        .and_then(|rest| rest.strip_suffix(RESULT_SUFFIX))
        .ok_or_else(|| ValsetError::Format(text.to_owned()))?;
    let json = inner.replace('\\', "");

    let raw: Vec<RawValidator> = serde_json::from_str(&json)?;
    raw.into_iter()
        .enumerate()
        .map(|(index, v)| {
            let pub_key = PubKeyEd25519::from_base64(&v.pubkey)
                .map_err(|source| ValsetError::PubKey { index, source })?;
            Ok(ValidatorUpdate {
                address: pub_key.address(),
                pub_key,
                power: v.vp,
            })
        })
        .collect()
}

/// Queries the validator set from a contract function.
#[derive(Clone, Debug)]
pub struct ValsetOracle {
    vm: VmKeeper,
    pkg_path: String,
    func: String,
}

impl ValsetOracle {
    pub fn new(vm: VmKeeper, pkg_path: impl Into<String>, func: impl Into<String>) -> Self {
        Self {
            vm,
            pkg_path: pkg_path.into(),
            func: func.into(),
        }
    }

    /// Calls the query function as the zero address with no funds.  Callers
    /// run this over a view they discard afterwards.
    pub fn validators(&self, ctx: &mut Context<'_>) -> Result<Vec<ValidatorUpdate>, ValsetError> {
        let text = self.vm.call(
            ctx,
            &Address::zero(),
            &Coins::empty(),
            &self.pkg_path,
            &self.func,
            &[],
        )?;
        let updates = decode_validator_set(&text)?;
        debug!(count = updates.len(), "decoded validator set");
        Ok(updates)
    }
}
