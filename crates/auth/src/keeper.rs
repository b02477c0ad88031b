use tessel_primitives::Address;
use tessel_sdk::Context;
use tessel_store::StoreKey;
use tracing::*;

use crate::{Account, AuthError, AuthResult};

const ACCOUNT_PREFIX: &[u8] = b"acc/";
const GLOBAL_ACCOUNT_NUMBER_KEY: &[u8] = b"globalAccountNumber";

/// Reads and writes account records in the main store.
#[derive(Clone, Debug)]
pub struct AccountKeeper {
    key: StoreKey,
}

impl AccountKeeper {
    pub fn new(key: StoreKey) -> Self {
        Self { key }
    }

    pub fn store_key(&self) -> &StoreKey {
        &self.key
    }

    pub fn get(&self, ctx: &Context<'_>, addr: &Address) -> AuthResult<Option<Account>> {
        match ctx.get(&self.key, &account_key(addr))? {
            Some(raw) => Ok(Some(borsh::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    /// Like [`Self::get`], but a missing account is an error.
    pub fn must_get(&self, ctx: &Context<'_>, addr: &Address) -> AuthResult<Account> {
        self.get(ctx, addr)?
            .ok_or(AuthError::AccountNotFound(*addr))
    }

    /// Creates a fresh account with the next account number and stores it.
    pub fn create(&self, ctx: &mut Context<'_>, addr: &Address) -> AuthResult<Account> {
        if ctx.has(&self.key, &account_key(addr))? {
            return Err(AuthError::AccountExists(*addr));
        }

        let number = self.next_account_number(ctx)?;
        let acct = Account::new(*addr, number);
        self.set(ctx, &acct)?;
        debug!(%addr, number, "created account");
        Ok(acct)
    }

    pub fn get_or_create(&self, ctx: &mut Context<'_>, addr: &Address) -> AuthResult<Account> {
        match self.get(ctx, addr)? {
            Some(acct) => Ok(acct),
            None => self.create(ctx, addr),
        }
    }

    pub fn set(&self, ctx: &mut Context<'_>, acct: &Account) -> AuthResult<()> {
        let raw = borsh::to_vec(acct)?;
        ctx.set(&self.key, &account_key(&acct.address), raw)?;
        Ok(())
    }

    fn next_account_number(&self, ctx: &mut Context<'_>) -> AuthResult<u64> {
        let current = match ctx.get(&self.key, GLOBAL_ACCOUNT_NUMBER_KEY)? {
            Some(raw) => borsh::from_slice::<u64>(&raw)?,
            None => 0,
        };
        let next = current
            .checked_add(1)
            .ok_or(AuthError::AccountNumberOverflow)?;
        ctx.set(&self.key, GLOBAL_ACCOUNT_NUMBER_KEY, borsh::to_vec(&next)?)?;
        Ok(current)
    }
}

fn account_key(addr: &Address) -> Vec<u8> {
    let mut key = ACCOUNT_PREFIX.to_vec();
    key.extend_from_slice(addr.as_bytes());
    key
}
