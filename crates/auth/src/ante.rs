//! Default ante steps.
//!
//! The default pipeline is:
//!
//! 1. [`InjectParams`] puts the [`AuthParams`] into the context.
//! 2. [`ValidateBasic`] checks message, signature and memo limits.
//! 3. [`DeductFee`] moves the fee from the first signer to the fee collector.
//! 4. [`VerifySignatures`] checks each signer's signature and bumps its
//!    sequence.

use tessel_primitives::{Address, Coins};
use tessel_sdk::{AntePipeline, AnteStep, Context, Event, HandlerError, SdkResult, StepKind, Tx};
use tracing::*;

use crate::{AccountKeeper, AuthError, AuthParams};

pub const INJECT_PARAMS: &str = "inject-params";
pub const VALIDATE_BASIC: &str = "validate-basic";
pub const DEDUCT_FEE: &str = "deduct-fee";
pub const VERIFY_SIGNATURES: &str = "verify-signatures";

/// Moves fees between accounts.  Implemented by the bank keeper.
pub trait FeePayer {
    fn pay_fee(
        &self,
        ctx: &mut Context<'_>,
        payer: &Address,
        collector: &Address,
        fee: &Coins,
    ) -> Result<(), HandlerError>;
}

/// Options of the default pipeline.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AnteOptions {
    /// Whether signatures of genesis transactions are checked.
    pub verify_genesis_signatures: bool,
}

impl Default for AnteOptions {
    fn default() -> Self {
        Self {
            verify_genesis_signatures: true,
        }
    }
}

/// Builds the default pipeline.
pub fn default_pipeline<B>(
    accounts: AccountKeeper,
    bank: B,
    params: AuthParams,
    opts: AnteOptions,
) -> SdkResult<AntePipeline>
where
    B: FeePayer + 'static,
{
    let mut pipeline = AntePipeline::new();
    pipeline.push(InjectParams::new(params))?;
    pipeline.push(ValidateBasic)?;
    pipeline.push(DeductFee::new(accounts.clone(), bank))?;
    pipeline.push(VerifySignatures::new(accounts, opts.verify_genesis_signatures))?;
    Ok(pipeline)
}

fn params<'c>(ctx: &'c Context<'_>) -> Result<&'c AuthParams, AuthError> {
    ctx.value::<AuthParams>().ok_or(AuthError::MissingParams)
}

/// Makes the auth params visible to later steps and handlers.
#[derive(Clone, Debug)]
pub struct InjectParams {
    params: AuthParams,
}

impl InjectParams {
    pub fn new(params: AuthParams) -> Self {
        Self { params }
    }
}

impl AnteStep for InjectParams {
    fn name(&self) -> &str {
        INJECT_PARAMS
    }

    fn kind(&self) -> StepKind {
        StepKind::Augment
    }

    fn run(&self, ctx: &mut Context<'_>, _tx: &Tx) -> Result<(), HandlerError> {
        ctx.insert_value(self.params.clone());
        Ok(())
    }
}

/// Stateless checks on the transaction's shape.
#[derive(Copy, Clone, Debug)]
pub struct ValidateBasic;

impl AnteStep for ValidateBasic {
    fn name(&self) -> &str {
        VALIDATE_BASIC
    }

    fn kind(&self) -> StepKind {
        StepKind::Check
    }

    fn run(&self, ctx: &mut Context<'_>, tx: &Tx) -> Result<(), HandlerError> {
        let params = params(ctx)?;

        if tx.msgs.is_empty() {
            return Err(AuthError::NoMessages.into());
        }

        let signers = tx.signers();
        if signers.is_empty() {
            return Err(AuthError::NoSigners.into());
        }
        if tx.signatures.len() != signers.len() {
            return Err(AuthError::WrongSignatureCount {
                expected: signers.len(),
                got: tx.signatures.len(),
            }
            .into());
        }
        if tx.signatures.len() > params.tx_sig_limit {
            return Err(AuthError::TooManySignatures {
                limit: params.tx_sig_limit,
                got: tx.signatures.len(),
            }
            .into());
        }
        if tx.memo.len() > params.max_memo_bytes {
            return Err(AuthError::MemoTooLarge {
                limit: params.max_memo_bytes,
                got: tx.memo.len(),
            }
            .into());
        }

        Ok(())
    }
}

/// Charges the fee to the first signer.
#[derive(Clone, Debug)]
pub struct DeductFee<B> {
    accounts: AccountKeeper,
    bank: B,
}

impl<B> DeductFee<B> {
    pub fn new(accounts: AccountKeeper, bank: B) -> Self {
        Self { accounts, bank }
    }
}

impl<B: FeePayer> AnteStep for DeductFee<B> {
    fn name(&self) -> &str {
        DEDUCT_FEE
    }

    fn kind(&self) -> StepKind {
        StepKind::Check
    }

    fn run(&self, ctx: &mut Context<'_>, tx: &Tx) -> Result<(), HandlerError> {
        let collector = params(ctx)?.fee_collector;
        let payer = *tx.signers().first().ok_or(AuthError::NoSigners)?;

        // The payer must exist even for free transactions.
        self.accounts.must_get(ctx, &payer)?;

        let fee = &tx.fee.gas_fee;
        if fee.is_empty() {
            return Ok(());
        }

        self.bank
            .pay_fee(ctx, &payer, &collector, fee)
            .map_err(|e| AuthError::FeePayment {
                payer,
                reason: e.to_string(),
            })?;

        ctx.emit_event(
            Event::new("fee")
                .attr("payer", payer)
                .attr("amount", fee),
        );
        Ok(())
    }
}

/// Checks every signer's signature and increments its sequence.
///
/// Unless `verify_genesis_signatures` is set, the cryptographic check is
/// skipped for transactions executed at genesis.  Key binding and sequence
/// updates happen either way.
#[derive(Clone, Debug)]
pub struct VerifySignatures {
    accounts: AccountKeeper,
    verify_genesis_signatures: bool,
}

impl VerifySignatures {
    pub fn new(accounts: AccountKeeper, verify_genesis_signatures: bool) -> Self {
        Self {
            accounts,
            verify_genesis_signatures,
        }
    }
}

impl AnteStep for VerifySignatures {
    fn name(&self) -> &str {
        VERIFY_SIGNATURES
    }

    fn kind(&self) -> StepKind {
        StepKind::Check
    }

    fn run(&self, ctx: &mut Context<'_>, tx: &Tx) -> Result<(), HandlerError> {
        let check_crypto = !ctx.is_genesis() || self.verify_genesis_signatures;
        let signers = tx.signers();
        if signers.len() != tx.signatures.len() {
            return Err(AuthError::WrongSignatureCount {
                expected: signers.len(),
                got: tx.signatures.len(),
            }
            .into());
        }

        for (addr, sig) in signers.iter().zip(&tx.signatures) {
            let mut acct = self.accounts.must_get(ctx, addr)?;

            let pub_key = match (sig.pub_key, acct.pub_key) {
                (Some(given), Some(bound)) if given != bound => {
                    return Err(AuthError::PubKeyMismatch(*addr).into());
                }
                (Some(given), _) => {
                    if given.address() != *addr {
                        return Err(AuthError::PubKeyMismatch(*addr).into());
                    }
                    given
                }
                (None, Some(bound)) => bound,
                (None, None) => return Err(AuthError::MissingPubKey(*addr).into()),
            };

            if check_crypto {
                let doc = tx.sign_bytes(ctx.chain_id(), acct.account_number, acct.sequence)?;
                pub_key
                    .verify(&doc, &sig.signature)
                    .map_err(|source| AuthError::Signature {
                        addr: *addr,
                        source,
                    })?;
            } else {
                trace!(%addr, "skipping genesis signature check");
            }

            acct.pub_key = Some(pub_key);
            acct.sequence += 1;
            self.accounts.set(ctx, &acct)?;
        }

        Ok(())
    }
}
