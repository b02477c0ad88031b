use std::{fmt, mem, rc::Rc};

use serde::{Deserialize, Serialize};
use tessel_auth::{
    AccountKeeper, AuthHandler, AuthParams,
    ante::{AnteOptions, default_pipeline},
};
use tessel_bank::{BankHandler, BankKeeper};
use tessel_config::Config;
use tessel_sdk::{AntePipeline, BlockHeader, Context, RouteError, Router, Tx, TxResult, TxStage};
use tessel_store::{BackendKind, CacheView, CommitId, StoreKey, StoreRegistry, WriteBatch};
use tessel_vm::{ContractRuntime, VmHandler, VmKeeper};
use tracing::*;

use crate::{
    AppError, AppResult, FailedGenesisTx, GenesisError, GenesisState, InitChainRequest,
    InitChainResponse, ValidatorUpdate, ValsetOracle,
};

/// Merkleized store holding accounts, balances, package metadata and realm
/// state.
pub const MAIN_STORE: &str = "main";

/// Durable store holding package code.  Not part of the app hash.
pub const BASE_STORE: &str = "base";

/// Where the app is in the block lifecycle.  The app only exists once its
/// stores are loaded, so there is no phase before that.
#[derive(Debug)]
enum Phase {
    Loaded,
    InBlock(BlockHeader),
    BlockEnded(BlockHeader),
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Loaded => "loaded",
            Phase::InBlock(_) => "in-block",
            Phase::BlockEnded(_) => "block-ended",
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct EndBlockResponse {
    pub validator_updates: Vec<ValidatorUpdate>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub chain_id: String,
    pub last_commit: CommitId,
}

/// The application.
///
/// Every lifecycle call takes `&mut self`; the caller drives it sequentially.
/// Writes of the current block, and of genesis before the first block,
/// accumulate in `pending` until `commit`.
pub struct App {
    name: String,
    version: String,
    chain_id: String,
    skip_failing_genesis_txs: bool,

    registry: StoreRegistry,
    accounts: AccountKeeper,
    bank: BankKeeper,
    vm: VmKeeper,
    ante: AntePipeline,
    router: Router,
    oracle: ValsetOracle,

    phase: Phase,
    pending: WriteBatch,
    genesis_done: bool,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("name", &self.name)
            .field("chain_id", &self.chain_id)
            .field("phase", &self.phase)
            .field("last_commit", &self.registry.last_commit_id())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Mounts the stores, builds the keepers, the ante pipeline and the
    /// router, loads the latest version and initializes the vm.
    #[instrument(skip_all, fields(chain_id = %config.app.chain_id))]
    pub fn new(
        config: &Config,
        mut registry: StoreRegistry,
        runtime: Rc<dyn ContractRuntime>,
    ) -> AppResult<Self> {
        let main = StoreKey::new(MAIN_STORE);
        let base = StoreKey::new(BASE_STORE);
        registry.mount(&main, BackendKind::Merkle)?;
        registry.mount(&base, BackendKind::Durable)?;

        let accounts = AccountKeeper::new(main.clone());
        let bank = BankKeeper::new(accounts.clone());
        let vm = VmKeeper::new(base, main, accounts.clone(), bank.clone(), runtime);

        let params = AuthParams {
            max_memo_bytes: config.ante.max_memo_bytes,
            tx_sig_limit: config.ante.tx_sig_limit,
            ..AuthParams::default()
        };
        let opts = AnteOptions {
            verify_genesis_signatures: config.app.verify_genesis_signatures,
        };
        let ante = default_pipeline(accounts.clone(), bank.clone(), params, opts)?;

        let mut router = Router::new();
        router.add_route(tessel_auth::ROUTE, AuthHandler)?;
        router.add_route(tessel_bank::ROUTE, BankHandler::new(bank.clone()))?;
        router.add_route(tessel_vm::ROUTE, VmHandler::new(vm.clone()))?;

        let last = registry.load_latest()?;
        info!(version = last.version, hash = %last.hash, "loaded stores");

        {
            let header = BlockHeader::default();
            let mut view = CacheView::new(&registry);
            let ctx = Context::new(&mut view, &header);
            vm.initialize(&ctx)?;
        }

        let oracle = ValsetOracle::new(
            vm.clone(),
            config.app.valset_pkg_path.clone(),
            config.app.valset_func.clone(),
        );

        Ok(Self {
            name: config.app.name.clone(),
            version: config.app.version.clone(),
            chain_id: config.app.chain_id.clone(),
            skip_failing_genesis_txs: config.app.skip_failing_genesis_txs,
            registry,
            accounts,
            bank,
            vm,
            ante,
            router,
            oracle,
            phase: Phase::Loaded,
            pending: WriteBatch::new(),
            genesis_done: false,
        })
    }

    pub fn info(&self) -> AppInfo {
        AppInfo {
            name: self.name.clone(),
            version: self.version.clone(),
            chain_id: self.chain_id.clone(),
            last_commit: self.registry.last_commit_id(),
        }
    }

    pub fn accounts(&self) -> &AccountKeeper {
        &self.accounts
    }

    pub fn bank(&self) -> &BankKeeper {
        &self.bank
    }

    pub fn vm(&self) -> &VmKeeper {
        &self.vm
    }

    /// The ante pipeline, for adding or replacing steps before the first
    /// block.
    pub fn ante_mut(&mut self) -> &mut AntePipeline {
        &mut self.ante
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Runs `f` over a view of committed state plus pending writes.  Writes
    /// made through the view are discarded.
    pub fn query<R>(&self, f: impl FnOnce(&mut Context<'_>) -> R) -> R {
        let header = self.current_header();
        let block_view = CacheView::with_batch(&self.registry, self.pending.clone());
        let mut view = CacheView::new(&block_view);
        let mut ctx = Context::new(&mut view, &header);
        f(&mut ctx)
    }

    /// Seeds balances, delivers the genesis transactions and reads the
    /// initial validator set.  Allowed once, before the first commit.
    #[instrument(skip_all, fields(chain_id = %req.chain_id))]
    pub fn init_chain(&mut self, req: InitChainRequest) -> AppResult<InitChainResponse> {
        self.ensure_phase("init_chain", |p| matches!(p, Phase::Loaded))?;
        if self.genesis_done || self.registry.last_commit_id().version != 0 {
            return Err(AppError::AlreadyInitialized);
        }
        self.check_chain_id(&req.chain_id)?;

        let state: GenesisState =
            serde_json::from_value(req.app_state).map_err(GenesisError::AppState)?;
        let header = BlockHeader::genesis(req.chain_id, req.time);

        let mut batch = mem::take(&mut self.pending);
        let res = self.apply_genesis(&header, &mut batch, state);
        match res {
            Ok(resp) => {
                self.pending = batch;
                self.genesis_done = true;
                info!(
                    validators = resp.validators.len(),
                    failed_txs = resp.failed_genesis_txs.len(),
                    "chain initialized"
                );
                Ok(resp)
            }
            Err(e) => {
                error!(%e, "genesis failed");
                Err(e)
            }
        }
    }

    fn apply_genesis(
        &self,
        header: &BlockHeader,
        batch: &mut WriteBatch,
        state: GenesisState,
    ) -> AppResult<InitChainResponse> {
        self.with_block_view(batch, |block_view| -> AppResult<()> {
            let mut view = CacheView::new(&*block_view);
            let mut ctx = Context::new(&mut view, header);
            for seed in &state.balances {
                self.accounts.get_or_create(&mut ctx, &seed.address)?;
                self.bank.set(&mut ctx, &seed.address, &seed.amount)?;
                trace!(%seed, "seeded balance");
            }
            drop(ctx);
            let writes = view.into_batch();
            block_view.absorb(writes);
            Ok(())
        })?;
        debug!(accounts = state.balances.len(), "seeded genesis balances");

        let mut failed_genesis_txs = Vec::new();
        for (index, tx) in state.txs.iter().enumerate() {
            let res = self.run_tx(header, batch, tx);
            if res.is_ok() {
                continue;
            }
            if !self.skip_failing_genesis_txs {
                return Err(GenesisError::TxFailed {
                    index,
                    log: res.log,
                }
                .into());
            }
            warn!(index, log = %res.log, "skipping failed genesis tx");
            failed_genesis_txs.push(FailedGenesisTx {
                index,
                log: res.log,
            });
        }

        let validators = self.read_validators(header, batch)?;
        Ok(InitChainResponse {
            validators,
            failed_genesis_txs,
        })
    }

    #[instrument(skip_all, fields(height = header.height))]
    pub fn begin_block(&mut self, header: BlockHeader) -> AppResult<()> {
        self.ensure_phase("begin_block", |p| matches!(p, Phase::Loaded))?;
        self.check_chain_id(&header.chain_id)?;

        let expected = self.registry.last_commit_id().version + 1;
        if header.height != expected {
            return Err(AppError::HeightMismatch {
                expected,
                got: header.height,
            });
        }

        trace!("began block");
        self.phase = Phase::InBlock(header);
        Ok(())
    }

    /// Delivers one transaction.  Failures are reported in the result and
    /// leave no trace in state.
    pub fn deliver_tx(&mut self, raw: &[u8]) -> AppResult<TxResult> {
        let Phase::InBlock(header) = &self.phase else {
            return Err(self.out_of_order("deliver_tx"));
        };
        let header = header.clone();

        let tx = match Tx::from_bytes(raw) {
            Ok(tx) => tx,
            Err(e) => return Ok(TxResult::failure(TxStage::Decode, e.to_string())),
        };

        let mut batch = mem::take(&mut self.pending);
        let res = self.run_tx(&header, &mut batch, &tx);
        self.pending = batch;
        Ok(res)
    }

    #[instrument(skip_all)]
    pub fn end_block(&mut self) -> AppResult<EndBlockResponse> {
        let Phase::InBlock(header) = &self.phase else {
            return Err(self.out_of_order("end_block"));
        };
        let header = header.clone();

        let mut batch = mem::take(&mut self.pending);
        let res = self.read_validators(&header, &mut batch);
        self.pending = batch;

        let validator_updates = res?;
        self.phase = Phase::BlockEnded(header);
        Ok(EndBlockResponse { validator_updates })
    }

    /// Persists the pending writes as the next version.
    #[instrument(skip_all)]
    pub fn commit(&mut self) -> AppResult<CommitId> {
        let Phase::BlockEnded(header) = &self.phase else {
            return Err(self.out_of_order("commit"));
        };
        let height = header.height;

        let batch = mem::take(&mut self.pending);
        let id = self.registry.commit(batch)?;
        self.phase = Phase::Loaded;

        info!(height, version = id.version, hash = %id.hash, "committed block");
        Ok(id)
    }

    /// Runs the ante pipeline and the router over a tx view stacked on the
    /// block view.  Only a fully successful tx reaches `batch`.
    fn run_tx(&self, header: &BlockHeader, batch: &mut WriteBatch, tx: &Tx) -> TxResult {
        self.with_block_view(batch, |block_view| {
            let mut view = CacheView::new(&*block_view);
            let mut ctx = Context::new(&mut view, header);

            if let Err(e) = self.ante.run(&mut ctx, tx) {
                debug!(%e, "tx rejected by ante");
                return TxResult::failure(TxStage::Ante, e.to_string());
            }

            let mut data = Vec::with_capacity(tx.msgs.len());
            for (i, msg) in tx.msgs.iter().enumerate() {
                match self.router.route(&mut ctx, msg) {
                    Ok(out) => data.push(out),
                    Err(e) => {
                        let stage = match e {
                            RouteError::NoRoute(_) => TxStage::Route,
                            RouteError::Handler { .. } => TxStage::Msg,
                        };
                        debug!(msg = i, %e, "tx failed");
                        return TxResult::failure(stage, format!("msg {i}: {e}"));
                    }
                }
            }

            let events = ctx.take_events();
            drop(ctx);
            let writes = view.into_batch();
            block_view.absorb(writes);
            TxResult::success(data, events)
        })
    }

    fn read_validators(
        &self,
        header: &BlockHeader,
        batch: &mut WriteBatch,
    ) -> AppResult<Vec<ValidatorUpdate>> {
        self.with_block_view(batch, |block_view| {
            let mut view = CacheView::new(&*block_view);
            let mut ctx = Context::new(&mut view, header);
            self.oracle.validators(&mut ctx).map_err(AppError::from)
        })
    }

    /// Stacks a view holding `batch` on the registry, runs `f`, and puts the
    /// view's writes back into `batch`.
    fn with_block_view<R>(
        &self,
        batch: &mut WriteBatch,
        f: impl FnOnce(&mut CacheView<'_>) -> R,
    ) -> R {
        let mut block_view = CacheView::with_batch(&self.registry, mem::take(batch));
        let out = f(&mut block_view);
        *batch = block_view.into_batch();
        out
    }

    fn current_header(&self) -> BlockHeader {
        match &self.phase {
            Phase::InBlock(h) | Phase::BlockEnded(h) => h.clone(),
            Phase::Loaded => BlockHeader {
                chain_id: self.chain_id.clone(),
                height: self.registry.last_commit_id().version,
                time: 0,
            },
        }
    }

    fn check_chain_id(&self, got: &str) -> AppResult<()> {
        if got != self.chain_id {
            return Err(AppError::ChainIdMismatch {
                expected: self.chain_id.clone(),
                got: got.to_owned(),
            });
        }
        Ok(())
    }

    fn ensure_phase(&self, op: &'static str, ok: impl FnOnce(&Phase) -> bool) -> AppResult<()> {
        if ok(&self.phase) {
            Ok(())
        } else {
            Err(self.out_of_order(op))
        }
    }

    fn out_of_order(&self, op: &'static str) -> AppError {
        AppError::OutOfOrder {
            op,
            phase: self.phase.name(),
        }
    }
}
