//! Nullable token ledger: a real in-memory token with injectable failures.

use tcr_token::{StandardToken, TokenError, TokenLedger};
use tcr_types::Account;

/// Wraps a [`StandardToken`] and can be told to reject upcoming mutating
/// calls, to exercise rollback paths.
///
/// A rejected call changes nothing, like any failed ledger call.
pub struct NullLedger {
    inner: StandardToken,
    /// Mutating calls that still succeed before failures start; `None` never fails.
    fail_after: Option<u64>,
    mutating_calls: u64,
}

impl NullLedger {
    pub fn new() -> Self {
        Self::wrap(StandardToken::new("Null Token", "NULL", 18))
    }

    pub fn wrap(inner: StandardToken) -> Self {
        Self {
            inner,
            fail_after: None,
            mutating_calls: 0,
        }
    }

    pub fn mint(&mut self, to: &Account, amount: u128) -> Result<(), TokenError> {
        self.inner.mint(to, amount)
    }

    /// Reject every mutating call from the next one on.
    pub fn fail_next(&mut self) {
        self.fail_after = Some(0);
    }

    /// Let `calls` more mutating calls succeed, then reject the rest.
    pub fn fail_after(&mut self, calls: u64) {
        self.fail_after = Some(calls);
    }

    /// Stop injecting failures.
    pub fn heal(&mut self) {
        self.fail_after = None;
    }

    /// Mutating calls that reached the inner token.
    pub fn mutating_calls(&self) -> u64 {
        self.mutating_calls
    }

    pub fn inner(&self) -> &StandardToken {
        &self.inner
    }

    fn gate(&mut self, op: &str) -> Result<(), TokenError> {
        match self.fail_after {
            Some(0) => Err(TokenError::Rejected(format!("{op}: injected failure"))),
            Some(n) => {
                self.fail_after = Some(n - 1);
                self.mutating_calls += 1;
                Ok(())
            }
            None => {
                self.mutating_calls += 1;
                Ok(())
            }
        }
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenLedger for NullLedger {
    fn total_supply(&self) -> u128 {
        self.inner.total_supply()
    }

    fn balance_of(&self, account: &Account) -> u128 {
        self.inner.balance_of(account)
    }

    fn allowance(&self, owner: &Account, spender: &Account) -> u128 {
        self.inner.allowance(owner, spender)
    }

    fn transfer(&mut self, from: &Account, to: &Account, amount: u128) -> Result<(), TokenError> {
        self.gate("transfer")?;
        self.inner.transfer(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Account,
        from: &Account,
        to: &Account,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.gate("transfer_from")?;
        self.inner.transfer_from(spender, from, to, amount)
    }

    fn approve(&mut self, owner: &Account, spender: &Account, amount: u128) -> Result<(), TokenError> {
        self.gate("approve")?;
        self.inner.approve(owner, spender, amount)
    }

    fn transfer_batch(&mut self, from: &Account, payouts: &[(Account, u128)]) -> Result<(), TokenError> {
        self.gate("transfer_batch")?;
        self.inner.transfer_batch(from, payouts)
    }
}
