//! Chain initialization: balance seeds, ordered genesis txs, failure
//! tolerance and the initial validator set.

#![expect(unused_crate_dependencies, reason = "test dependencies")]

mod common;

use std::{cell::Cell, rc::Rc};

use common::*;
use tessel_app::{AppError, GenesisError, ValsetError};
use tessel_bank::MsgSend;
use tessel_primitives::Address;
use tessel_sdk::{Context, HandlerError, Msg, MsgHandler};
use tessel_store::StoreRegistry;
use tessel_test_utils::TestKey;
use tessel_vm::{CallEnv, NativePackage, RuntimeError, TypedValue};

fn send_tx(from: &TestKey, to: Address, amount: &str, seq: u64) -> tessel_sdk::Tx {
    let msg = Msg::new(&MsgSend {
        from_address: from.address(),
        to_address: to,
        amount: coins(amount),
    })
    .unwrap();
    signed_tx(from, vec![msg], "", 0, seq)
}

/// Handler that counts the messages routed to it.
#[derive(Clone, Default)]
struct Counter {
    hits: Rc<Cell<u32>>,
}

impl MsgHandler for Counter {
    fn handle(&self, _ctx: &mut Context<'_>, _msg: &Msg) -> Result<Vec<u8>, HandlerError> {
        self.hits.set(self.hits.get() + 1);
        Ok(Vec::new())
    }
}

fn counted_msg(signer: &TestKey) -> Msg {
    Msg {
        route: "count".to_owned(),
        kind: "tick".to_owned(),
        signers: vec![signer.address()],
        value: serde_json::json!({}),
    }
}

#[test]
fn test_seeds_balances_and_validators() {
    let (alice, bob, val) = (TestKey::new(1), TestKey::new(2), TestKey::new(200));
    let mut app = new_app(&config());

    let resp = app
        .init_chain(genesis_request(
            vec![
                seed(alice.address(), "100ugnot,5foo"),
                seed(bob.address(), "7ugnot"),
            ],
            valset_genesis_txs(&alice, &val),
        ))
        .unwrap();

    assert!(resp.failed_genesis_txs.is_empty());
    assert_eq!(resp.validators.len(), 1);
    assert_eq!(resp.validators[0].pub_key, val.pub_key());
    assert_eq!(resp.validators[0].address, val.address());
    assert_eq!(resp.validators[0].power, 10);

    assert_eq!(balance(&app, &alice.address()), coins("100ugnot,5foo"));
    assert_eq!(balance(&app, &bob.address()), coins("7ugnot"));

    // Genesis writes are committed with the first block.
    assert_eq!(app.info().last_commit.version, 0);
    let (_, id) = run_block(&mut app, &[]);
    assert_eq!(id.version, 1);
    assert_eq!(balance(&app, &bob.address()), coins("7ugnot"));
}

#[test]
fn test_txs_applied_in_order() {
    let (alice, bob, val) = (TestKey::new(1), TestKey::new(2), TestKey::new(200));
    let carol = TestKey::new(3);
    let mut app = new_app(&config());

    let mut txs = valset_genesis_txs(&alice, &val);
    // Bob can only pay carol after alice paid him.
    txs.push(send_tx(&alice, bob.address(), "40ugnot", 2));
    txs.push(send_tx(&bob, carol.address(), "30ugnot", 0));

    let resp = app
        .init_chain(genesis_request(
            vec![seed(alice.address(), "100ugnot")],
            txs,
        ))
        .unwrap();

    assert!(resp.failed_genesis_txs.is_empty());
    assert_eq!(balance(&app, &alice.address()), coins("60ugnot"));
    assert_eq!(balance(&app, &bob.address()), coins("10ugnot"));
    assert_eq!(balance(&app, &carol.address()), coins("30ugnot"));
}

#[test]
fn test_tolerant_genesis_skips_failures() {
    let (alice, bob, val) = (TestKey::new(1), TestKey::new(2), TestKey::new(200));
    let mut cfg = config();
    cfg.app.skip_failing_genesis_txs = true;
    let mut app = new_app(&cfg);

    let mut txs = valset_genesis_txs(&alice, &val);
    txs.insert(1, send_tx(&alice, bob.address(), "1000ugnot", 1));
    txs.push(send_tx(&alice, bob.address(), "10ugnot", 2));

    let resp = app
        .init_chain(genesis_request(
            vec![seed(alice.address(), "100ugnot")],
            txs,
        ))
        .unwrap();

    assert_eq!(resp.failed_genesis_txs.len(), 1);
    assert_eq!(resp.failed_genesis_txs[0].index, 1);
    assert!(resp.failed_genesis_txs[0].log.contains("insufficient"));
    assert_eq!(resp.validators.len(), 1);
    assert_eq!(balance(&app, &bob.address()), coins("10ugnot"));
}

#[test]
fn test_intolerant_genesis_halts_at_failure() {
    let (alice, bob, val) = (TestKey::new(1), TestKey::new(2), TestKey::new(200));
    let mut app = new_app(&config());
    let counter = Counter::default();
    app.router_mut().add_route("count", counter.clone()).unwrap();

    let mut txs = valset_genesis_txs(&alice, &val);
    txs.push(send_tx(&alice, bob.address(), "1000ugnot", 2));
    // Valid on its own, must never be delivered.
    txs.push(signed_tx(&alice, vec![counted_msg(&alice)], "", 0, 2));

    let err = app
        .init_chain(genesis_request(
            vec![seed(alice.address(), "100ugnot")],
            txs,
        ))
        .unwrap_err();

    match err {
        AppError::Genesis(GenesisError::TxFailed { index, log }) => {
            assert_eq!(index, 2);
            assert!(log.contains("insufficient"), "{log}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(counter.hits.get(), 0);
}

#[test]
fn test_bad_balance_seed_is_fatal() {
    let mut cfg = config();
    cfg.app.skip_failing_genesis_txs = true;

    for bad in ["no-separator", "g1notanaddress=1ugnot"] {
        let mut app = new_app(&cfg);
        let res = app.init_chain(genesis_request(vec![bad.to_owned()], vec![]));
        assert!(
            matches!(res, Err(AppError::Genesis(GenesisError::AppState(_)))),
            "{bad}: {res:?}"
        );
    }

    let mut app = new_app(&cfg);
    let bad_coins = seed(TestKey::new(1).address(), "tenugnot");
    let res = app.init_chain(genesis_request(vec![bad_coins], vec![]));
    assert!(matches!(res, Err(AppError::Genesis(GenesisError::AppState(_)))));
}

#[test]
fn test_malformed_app_state() {
    let mut app = new_app(&config());
    let mut req = genesis_request(vec![], vec![]);
    req.app_state = serde_json::json!({ "txs": "nope" });
    assert!(matches!(
        app.init_chain(req),
        Err(AppError::Genesis(GenesisError::AppState(_)))
    ));
}

#[test]
fn test_missing_validator_registry_fails() {
    let mut app = new_app(&config());
    let res = app.init_chain(genesis_request(vec![], vec![]));
    assert!(matches!(res, Err(AppError::Valset(ValsetError::Query(_)))));
}

#[test]
fn test_init_chain_once() {
    let (alice, val) = (TestKey::new(1), TestKey::new(200));
    let mut app = new_app(&config());
    let req = || {
        genesis_request(
            vec![seed(alice.address(), "1ugnot")],
            valset_genesis_txs(&alice, &val),
        )
    };
    app.init_chain(req()).unwrap();
    assert!(matches!(
        app.init_chain(req()),
        Err(AppError::AlreadyInitialized)
    ));
}

#[test]
fn test_wrong_chain_id() {
    let mut app = new_app(&config());
    let mut req = genesis_request(vec![], vec![]);
    req.chain_id = "elsewhere".to_owned();
    assert!(matches!(
        app.init_chain(req),
        Err(AppError::ChainIdMismatch { .. })
    ));
}

/// Validator registry returning a key that is only 16 bytes long.
struct ShortKeyRegistry;

impl NativePackage for ShortKeyRegistry {
    fn call(
        &self,
        _env: &mut CallEnv<'_, '_>,
        _func: &str,
        _args: &[String],
    ) -> Result<Vec<TypedValue>, RuntimeError> {
        let json = r#"[{"address":"g1x","pubkey":"AAAAAAAAAAAAAAAAAAAAAA==","vp":1}]"#;
        Ok(vec![TypedValue::String(json.to_owned())])
    }
}

#[test]
fn test_short_validator_key_fails_init() {
    const PATH: &str = "gno.land/r/shortkeys";
    let alice = TestKey::new(1);
    let mut cfg = config();
    cfg.app.valset_pkg_path = PATH.to_owned();
    let runtime = runtime().with_package(PATH, ShortKeyRegistry);
    let mut app = new_app_with(&cfg, StoreRegistry::open_temporary().unwrap(), runtime);

    let deploy = signed_tx(&alice, vec![add_package_msg(&alice, PATH)], "", 0, 0);
    let res = app.init_chain(genesis_request(
        vec![seed(alice.address(), "1ugnot")],
        vec![deploy],
    ));
    assert!(
        matches!(
            res,
            Err(AppError::Valset(ValsetError::PubKey { index: 0, .. }))
        ),
        "{res:?}"
    );
}
