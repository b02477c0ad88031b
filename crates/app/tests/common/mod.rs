//! Fixtures shared by the app integration tests.

#![allow(unreachable_pub, reason = "test utilities")]
#![allow(dead_code, reason = "not every test binary uses every fixture")]

use std::rc::Rc;

use tessel_app::{App, InitChainRequest};
use tessel_config::Config;
use tessel_primitives::{Address, Coins};
use tessel_sdk::{BlockHeader, Fee, Msg, Tx, TxResult};
use tessel_store::{CommitId, StoreRegistry};
use tessel_test_utils::{SignerInfo, TestKey, sign_tx};
use tessel_vm::{
    ContractRuntime, MemFile, MemPackage, MsgAddPackage, MsgCall, NativeRuntime,
    VALIDATORS_PKG_PATH, ValidatorsRealm,
};

pub const CHAIN_ID: &str = "tessel-test";

pub fn config() -> Config {
    let mut cfg = Config::default();
    cfg.app.chain_id = CHAIN_ID.to_owned();
    cfg
}

pub fn runtime() -> NativeRuntime {
    NativeRuntime::new().with_package(VALIDATORS_PKG_PATH, ValidatorsRealm)
}

pub fn new_app(cfg: &Config) -> App {
    new_app_with(cfg, StoreRegistry::open_temporary().unwrap(), runtime())
}

pub fn new_app_with(cfg: &Config, registry: StoreRegistry, runtime: NativeRuntime) -> App {
    let runtime: Rc<dyn ContractRuntime> = Rc::new(runtime);
    App::new(cfg, registry, runtime).unwrap()
}

pub fn coins(s: &str) -> Coins {
    s.parse().unwrap()
}

pub fn package(path: &str) -> MemPackage {
    let name = path.rsplit('/').next().unwrap().to_owned();
    MemPackage {
        files: vec![MemFile {
            name: format!("{name}.gno"),
            body: format!("package {name}"),
        }],
        name,
        path: path.to_owned(),
    }
}

/// Builds a tx from `msgs` signed by `key` at the given account number and
/// sequence.
pub fn signed_tx(key: &TestKey, msgs: Vec<Msg>, fee: &str, acct_num: u64, seq: u64) -> Tx {
    let mut tx = Tx {
        msgs,
        fee: Fee {
            gas_wanted: 100_000,
            gas_fee: coins(fee),
        },
        signatures: Vec::new(),
        memo: String::new(),
    };
    sign_tx(&mut tx, CHAIN_ID, &[SignerInfo::new(key, acct_num, seq)]);
    tx
}

pub fn add_package_msg(creator: &TestKey, path: &str) -> Msg {
    Msg::new(&MsgAddPackage {
        creator: creator.address(),
        package: package(path),
        deposit: Coins::empty(),
    })
    .unwrap()
}

pub fn call_msg(caller: &TestKey, pkg_path: &str, func: &str, args: &[String]) -> Msg {
    Msg::new(&MsgCall {
        caller: caller.address(),
        send: Coins::empty(),
        pkg_path: pkg_path.to_owned(),
        func: func.to_owned(),
        args: args.to_vec(),
    })
    .unwrap()
}

pub fn add_validator_msg(admin: &TestKey, validator: &TestKey, power: i64) -> Msg {
    call_msg(
        admin,
        VALIDATORS_PKG_PATH,
        "AddValidator",
        &[validator.pub_key().to_base64(), power.to_string()],
    )
}

/// Genesis txs deploying the validator registry as `admin` and registering
/// `validator` with power 10.
pub fn valset_genesis_txs(admin: &TestKey, validator: &TestKey) -> Vec<Tx> {
    vec![
        signed_tx(admin, vec![add_package_msg(admin, VALIDATORS_PKG_PATH)], "", 0, 0),
        signed_tx(admin, vec![add_validator_msg(admin, validator, 10)], "", 0, 1),
    ]
}

pub fn seed(addr: Address, amount: &str) -> String {
    format!("{addr}={amount}")
}

pub fn genesis_request(balances: Vec<String>, txs: Vec<Tx>) -> InitChainRequest {
    InitChainRequest {
        chain_id: CHAIN_ID.to_owned(),
        time: 1_700_000_000,
        app_state: serde_json::json!({
            "balances": balances,
            "txs": txs,
        }),
    }
}

pub fn header(height: u64) -> BlockHeader {
    BlockHeader {
        chain_id: CHAIN_ID.to_owned(),
        height,
        time: 1_700_000_000 + height,
    }
}

/// Runs one block with the given txs and commits it.
pub fn run_block(app: &mut App, txs: &[Tx]) -> (Vec<TxResult>, CommitId) {
    let height = app.info().last_commit.version + 1;
    app.begin_block(header(height)).unwrap();
    let results = txs
        .iter()
        .map(|tx| app.deliver_tx(&tx.to_bytes().unwrap()).unwrap())
        .collect();
    app.end_block().unwrap();
    let id = app.commit().unwrap();
    (results, id)
}

pub fn balance(app: &App, addr: &Address) -> Coins {
    app.query(|ctx| app.bank().get(ctx, addr).unwrap())
}

/// Account number and sequence of an existing account.
pub fn account_state(app: &App, addr: &Address) -> (u64, u64) {
    let acct = app.query(|ctx| app.accounts().must_get(ctx, addr).unwrap());
    (acct.account_number, acct.sequence)
}
