//! Abstract token ledger trait.
//!
//! Every call is atomic: it either applies completely or returns an error and
//! leaves every balance and allowance untouched.

use crate::error::TokenError;
use tcr_types::Account;

pub trait TokenLedger {
    /// Total tokens in existence.
    fn total_supply(&self) -> u128;

    fn balance_of(&self, account: &Account) -> u128;

    /// Remaining amount `spender` may move out of `owner` via `transfer_from`.
    fn allowance(&self, owner: &Account, spender: &Account) -> u128;

    /// Move `amount` from `from` to `to`, authorised by `from` itself.
    fn transfer(&mut self, from: &Account, to: &Account, amount: u128) -> Result<(), TokenError>;

    /// Move `amount` from `from` to `to`, authorised by an allowance `from`
    /// granted to `spender`. The allowance is consumed.
    fn transfer_from(
        &mut self,
        spender: &Account,
        from: &Account,
        to: &Account,
        amount: u128,
    ) -> Result<(), TokenError>;

    /// Set the allowance `owner` grants to `spender`.
    fn approve(&mut self, owner: &Account, spender: &Account, amount: u128) -> Result<(), TokenError>;

    /// Pay several recipients out of `from` as one atomic call.
    ///
    /// The default checks the combined total against the balance before
    /// moving anything, which is atomic for any ledger whose `transfer` can
    /// only fail on an insufficient balance. Ledgers with other failure modes
    /// must override it.
    fn transfer_batch(&mut self, from: &Account, payouts: &[(Account, u128)]) -> Result<(), TokenError> {
        let total = payouts
            .iter()
            .try_fold(0u128, |acc, (_, amount)| acc.checked_add(*amount))
            .ok_or(TokenError::Overflow)?;
        let available = self.balance_of(from);
        if available < total {
            return Err(TokenError::InsufficientBalance {
                account: from.to_string(),
                needed: total,
                available,
            });
        }
        for (to, amount) in payouts {
            if *amount > 0 {
                self.transfer(from, to, *amount)?;
            }
        }
        Ok(())
    }
}

impl<T: TokenLedger + ?Sized> TokenLedger for &mut T {
    fn total_supply(&self) -> u128 {
        (**self).total_supply()
    }

    fn balance_of(&self, account: &Account) -> u128 {
        (**self).balance_of(account)
    }

    fn allowance(&self, owner: &Account, spender: &Account) -> u128 {
        (**self).allowance(owner, spender)
    }

    fn transfer(&mut self, from: &Account, to: &Account, amount: u128) -> Result<(), TokenError> {
        (**self).transfer(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Account,
        from: &Account,
        to: &Account,
        amount: u128,
    ) -> Result<(), TokenError> {
        (**self).transfer_from(spender, from, to, amount)
    }

    fn approve(&mut self, owner: &Account, spender: &Account, amount: u128) -> Result<(), TokenError> {
        (**self).approve(owner, spender, amount)
    }

    fn transfer_batch(&mut self, from: &Account, payouts: &[(Account, u128)]) -> Result<(), TokenError> {
        (**self).transfer_batch(from, payouts)
    }
}
