//! Caller-side authorization for privileged burns
//!
//! The ledger burns from whichever holder it is given. Restricting burns to
//! a single designated sender is a policy decision taken here, before the
//! generic [`Ledger::burn`] is invoked.

use crate::{
    actor::LedgerHandle,
    types::{AccountId, LedgerEvent},
    Error, Ledger, Result,
};
use num_bigint::BigInt;

/// Capability to burn from the designated sender's balance
#[derive(Debug, Clone)]
pub struct BurnAuthority {
    sender: AccountId,
}

impl BurnAuthority {
    /// Grant burn rights to `sender` only
    pub fn new(sender: impl Into<AccountId>) -> Self {
        Self {
            sender: sender.into(),
        }
    }

    /// Designated sender
    pub fn sender(&self) -> &AccountId {
        &self.sender
    }

    /// Check `caller` and return the holder whose funds it may burn
    pub fn authorize(&self, caller: &AccountId) -> Result<&AccountId> {
        if caller != &self.sender {
            tracing::warn!(caller = %caller, "Burn denied");
            return Err(Error::Unauthorized(caller.clone()));
        }
        Ok(&self.sender)
    }

    /// Burn `amount` from the sender's balance on behalf of `caller`
    pub fn burn(
        &self,
        ledger: &mut Ledger,
        caller: &AccountId,
        amount: impl Into<BigInt>,
    ) -> Result<LedgerEvent> {
        let holder = self.authorize(caller)?;
        ledger.burn(holder, amount)
    }

    /// Same as [`BurnAuthority::burn`], through the ledger actor
    pub async fn burn_via(
        &self,
        handle: &LedgerHandle,
        caller: &AccountId,
        amount: impl Into<BigInt>,
    ) -> Result<LedgerEvent> {
        let holder = self.authorize(caller)?;
        handle.burn(holder.clone(), amount).await
    }
}
