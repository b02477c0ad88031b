//! Subcommand implementations.

use std::{fs, path::Path, rc::Rc};

use format_serde_error::SerdeError;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tessel_app::{App, AppError, InitChainRequest};
use tessel_config::Config;
use tessel_sdk::{BlockHeader, TxResult};
use tessel_store::{CommitId, StoreRegistry};
use tessel_vm::{NativeRuntime, VALIDATORS_PKG_PATH, ValidatorsRealm};
use tracing::*;

use crate::errors::InitError;

/// Genesis file: the chain id, the genesis time and the application state.
#[derive(Debug, Deserialize)]
pub(crate) struct GenesisDoc {
    pub chain_id: String,
    #[serde(default)]
    pub genesis_time: u64,
    pub app_state: serde_json::Value,
}

/// One block of a replay file.  Transactions are kept as raw JSON so that
/// undecodable ones are reported by the app like any other failure.
#[derive(Debug, Deserialize)]
pub(crate) struct BlockInput {
    #[serde(default)]
    pub time: u64,
    #[serde(default)]
    pub txs: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BlockReport {
    pub height: u64,
    pub commit: CommitId,
    pub results: Vec<TxResult>,
    pub validators: usize,
}

pub(crate) fn open_app(config: &Config) -> Result<App, InitError> {
    let registry = StoreRegistry::open(&config.store.datadir).map_err(AppError::from)?;
    let runtime = NativeRuntime::new().with_package(VALIDATORS_PKG_PATH, ValidatorsRealm);
    Ok(App::new(config, registry, Rc::new(runtime))?)
}

/// Runs genesis, then an empty first block so the genesis writes are
/// committed.
pub(crate) fn init_chain(app: &mut App, genesis: &Path) -> Result<serde_json::Value, InitError> {
    let doc: GenesisDoc = load_json(genesis)?;
    let resp = app.init_chain(InitChainRequest {
        chain_id: doc.chain_id.clone(),
        time: doc.genesis_time,
        app_state: doc.app_state,
    })?;
    for failed in &resp.failed_genesis_txs {
        warn!(index = failed.index, log = %failed.log, "genesis tx skipped");
    }

    let report = apply_block(app, doc.genesis_time, &[])?;
    info!(version = report.commit.version, "genesis committed");
    Ok(serde_json::json!({
        "validators": resp.validators,
        "failed_genesis_txs": resp.failed_genesis_txs,
        "commit": report.commit,
    }))
}

pub(crate) fn replay(app: &mut App, blocks: &Path) -> Result<Vec<BlockReport>, InitError> {
    let blocks: Vec<BlockInput> = load_json(blocks)?;
    let mut reports = Vec::with_capacity(blocks.len());
    for block in &blocks {
        let raw = block
            .txs
            .iter()
            .map(serde_json::to_vec)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| InitError::Io(e.into()))?;
        reports.push(apply_block(app, block.time, &raw)?);
    }
    Ok(reports)
}

fn apply_block(app: &mut App, time: u64, txs: &[Vec<u8>]) -> Result<BlockReport, InitError> {
    let info = app.info();
    let height = info.last_commit.version + 1;
    app.begin_block(BlockHeader {
        chain_id: info.chain_id,
        height,
        time,
    })?;

    let mut results = Vec::with_capacity(txs.len());
    for (i, raw) in txs.iter().enumerate() {
        let res = app.deliver_tx(raw)?;
        if !res.is_ok() {
            warn!(height, tx = i, code = res.code, log = %res.log, "tx failed");
        }
        results.push(res);
    }

    let end = app.end_block()?;
    let commit = app.commit()?;
    Ok(BlockReport {
        height,
        commit,
        results,
        validators: end.validator_updates.len(),
    })
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, InitError> {
    let json = fs::read_to_string(path)?;
    let val = serde_json::from_str::<T>(&json).map_err(|err| SerdeError::new(json, err))?;
    Ok(val)
}
