//! CLI argument parsing.

use std::path::PathBuf;

use argh::FromArgs;

use crate::errors::*;

#[derive(Clone, Debug, FromArgs)]
#[argh(description = "Tessel application node")]
pub(crate) struct Args {
    // Config non-overriding args
    #[argh(option, short = 'c', description = "path to configuration")]
    pub config: Option<PathBuf>,

    // Config overriding args
    /// Data directory path that will override the path in the config toml.
    #[argh(
        option,
        short = 'd',
        description = "datadir path used mainly for databases"
    )]
    pub datadir: Option<PathBuf>,

    /// Chain id that will override the one in the config toml.
    #[argh(option, description = "chain id")]
    pub chain_id: Option<String>,

    /// Keep going past failing genesis transactions.
    #[argh(switch, description = "skip failing genesis txs")]
    pub skip_failing_genesis_txs: bool,

    /// Other generic overrides to the config toml.
    /// Will be used, for example, as `-o ante.tx_sig_limit=3 -o logging.json_format=true`
    #[argh(option, short = 'o', description = "generic config overrides")]
    pub overrides: Vec<String>,

    #[argh(subcommand)]
    pub command: Command,
}

impl Args {
    /// Get strings of overrides gathered from user and internal attributes.
    pub(crate) fn get_all_overrides(&self) -> Result<Vec<String>, InitError> {
        let mut overrides = self.overrides.clone();
        overrides.extend_from_slice(&self.get_internal_overrides()?);
        Ok(overrides)
    }

    /// Overrides passed directly as args attributes.
    fn get_internal_overrides(&self) -> Result<Vec<String>, InitError> {
        let mut overrides = Vec::new();
        if let Some(datadir) = &self.datadir {
            let dd = datadir
                .to_str()
                .ok_or_else(|| InitError::InvalidDatadirPath(datadir.clone()))?;
            overrides.push(format!("store.datadir={dd:?}"));
        }
        if let Some(chain_id) = &self.chain_id {
            overrides.push(format!("app.chain_id={chain_id:?}"));
        }
        if self.skip_failing_genesis_txs {
            overrides.push("app.skip_failing_genesis_txs=true".to_owned());
        }
        Ok(overrides)
    }
}

#[derive(Clone, Debug, FromArgs)]
#[argh(subcommand)]
pub(crate) enum Command {
    Init(InitCmd),
    Replay(ReplayCmd),
    Status(StatusCmd),
}

/// Initialize the chain from a genesis file and commit the first block.
#[derive(Clone, Debug, FromArgs)]
#[argh(subcommand, name = "init")]
pub(crate) struct InitCmd {
    #[argh(option, short = 'g', description = "path to the genesis JSON")]
    pub genesis: PathBuf,
}

/// Apply blocks of transactions read from a JSON file.
#[derive(Clone, Debug, FromArgs)]
#[argh(subcommand, name = "replay")]
pub(crate) struct ReplayCmd {
    #[argh(option, short = 'b', description = "path to the blocks JSON")]
    pub blocks: PathBuf,
}

/// Print the last committed version and app hash.
#[derive(Clone, Debug, FromArgs)]
#[argh(subcommand, name = "status")]
pub(crate) struct StatusCmd {}
