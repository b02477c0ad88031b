use tessel_auth::{AccountKeeper, ante::FeePayer};
use tessel_primitives::{Address, Coins};
use tessel_sdk::{Context, Event, HandlerError};
use tessel_store::StoreKey;
use tracing::*;

use crate::{BankError, BankResult};

const BALANCE_PREFIX: &[u8] = b"bal/";

/// Balances keyed by address, stored next to the account records.
#[derive(Clone, Debug)]
pub struct BankKeeper {
    key: StoreKey,
    accounts: AccountKeeper,
}

impl BankKeeper {
    pub fn new(accounts: AccountKeeper) -> Self {
        Self {
            key: accounts.store_key().clone(),
            accounts,
        }
    }

    pub fn accounts(&self) -> &AccountKeeper {
        &self.accounts
    }

    pub fn get(&self, ctx: &Context<'_>, addr: &Address) -> BankResult<Coins> {
        match ctx.get(&self.key, &balance_key(addr))? {
            Some(raw) => Ok(borsh::from_slice(&raw)?),
            None => Ok(Coins::empty()),
        }
    }

    /// Overwrites a balance.  The account must exist.
    pub fn set(&self, ctx: &mut Context<'_>, addr: &Address, coins: &Coins) -> BankResult<()> {
        if self.accounts.get(ctx, addr)?.is_none() {
            return Err(BankError::NoAccount(*addr));
        }
        self.write(ctx, addr, coins)
    }

    /// Credits an account, creating it if absent.
    pub fn add(&self, ctx: &mut Context<'_>, addr: &Address, amt: &Coins) -> BankResult<Coins> {
        self.accounts.get_or_create(ctx, addr)?;
        let new = self
            .get(ctx, addr)?
            .checked_add(amt)
            .map_err(|source| BankError::Overflow {
                addr: *addr,
                source,
            })?;
        self.write(ctx, addr, &new)?;
        Ok(new)
    }

    /// Debits an account.  Fails without writing if any denomination would go
    /// negative.
    pub fn subtract(
        &self,
        ctx: &mut Context<'_>,
        addr: &Address,
        amt: &Coins,
    ) -> BankResult<Coins> {
        let new = self
            .get(ctx, addr)?
            .checked_sub(amt)
            .map_err(|source| BankError::InsufficientFunds {
                addr: *addr,
                source,
            })?;
        self.write(ctx, addr, &new)?;
        Ok(new)
    }

    pub fn send(
        &self,
        ctx: &mut Context<'_>,
        from: &Address,
        to: &Address,
        amt: &Coins,
    ) -> BankResult<()> {
        self.subtract(ctx, from, amt)?;
        self.add(ctx, to, amt)?;

        trace!(%from, %to, %amt, "sent coins");
        ctx.emit_event(
            Event::new("transfer")
                .attr("sender", from)
                .attr("recipient", to)
                .attr("amount", amt),
        );
        Ok(())
    }

    fn write(&self, ctx: &mut Context<'_>, addr: &Address, coins: &Coins) -> BankResult<()> {
        ctx.set(&self.key, &balance_key(addr), borsh::to_vec(coins)?)?;
        Ok(())
    }
}

impl FeePayer for BankKeeper {
    fn pay_fee(
        &self,
        ctx: &mut Context<'_>,
        payer: &Address,
        collector: &Address,
        fee: &Coins,
    ) -> Result<(), HandlerError> {
        self.subtract(ctx, payer, fee)?;
        self.add(ctx, collector, fee)?;
        Ok(())
    }
}

fn balance_key(addr: &Address) -> Vec<u8> {
    let mut key = BALANCE_PREFIX.to_vec();
    key.extend_from_slice(addr.as_bytes());
    key
}
