//! Tessel node binary entrypoint.

use anyhow::{Result, anyhow};
use argh::from_env;
use tessel_common::logging::{self, LoggerConfig};
use tessel_config::Config;
use tokio::runtime::{self, Runtime};
use tracing::*;

use crate::{
    args::{Args, Command},
    errors::InitError,
};

mod args;
mod commands;
mod config;
mod errors;

fn main() -> Result<()> {
    let args: Args = from_env();

    let config =
        config::load_config(&args).map_err(|e| anyhow!("Failed to load configuration: {e}"))?;

    // Only hosts the OTLP exporter; the app itself runs on this thread.
    let rt = runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("tessel-rt")
        .build()
        .map_err(InitError::RuntimeBuild)?;
    init_logging(&rt, &config)?;

    let res = run(&args.command, &config);
    if let Err(e) = &res {
        error!(%e, "command failed");
    }

    logging::finalize();
    res.map_err(|e| anyhow!("{e}"))
}

fn run(command: &Command, config: &Config) -> Result<(), InitError> {
    let mut app = commands::open_app(config)?;
    match command {
        Command::Init(cmd) => {
            let out = commands::init_chain(&mut app, &cmd.genesis)?;
            print_json(&out);
        }
        Command::Replay(cmd) => {
            let reports = commands::replay(&mut app, &cmd.blocks)?;
            print_json(&reports);
        }
        Command::Status(_) => print_json(&app.info()),
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(val: &T) {
    match serde_json::to_string_pretty(val) {
        Ok(s) => println!("{s}"),
        Err(e) => error!(%e, "failed to render output"),
    }
}

fn init_logging(rt: &Runtime, config: &Config) -> Result<(), InitError> {
    // Need to set the runtime context for async OTLP setup
    let _g = rt.enter();
    let lconfig = LoggerConfig::from_node_config("tessel-node", &config.logging)
        .with_service_version(config.app.version.clone());
    logging::init(lconfig)?;
    Ok(())
}
