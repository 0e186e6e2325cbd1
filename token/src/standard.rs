//! In-memory fungible token with standard balance/allowance semantics.

use crate::error::TokenError;
use crate::ledger::TokenLedger;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tcr_types::Account;

/// A fungible token held entirely in memory.
///
/// An allowance of `u128::MAX` is treated as unlimited and is never
/// decremented by `transfer_from`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StandardToken {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    total_supply: u128,
    balances: HashMap<Account, u128>,
    /// owner -> spender -> remaining allowance
    allowances: HashMap<Account, HashMap<Account, u128>>,
}

impl StandardToken {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            ..Self::default()
        }
    }

    /// Create `amount` new tokens in `to`'s balance (genesis allocation).
    pub fn mint(&mut self, to: &Account, amount: u128) -> Result<(), TokenError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.total_supply = supply;
        self.balances.insert(to.clone(), balance);
        tracing::trace!(%to, amount, "minted");
        Ok(())
    }

    /// Every account holding a non-zero balance.
    pub fn holders(&self) -> impl Iterator<Item = (&Account, u128)> {
        self.balances
            .iter()
            .filter(|(_, b)| **b > 0)
            .map(|(a, b)| (a, *b))
    }

    fn move_balance(&mut self, from: &Account, to: &Account, amount: u128) -> Result<(), TokenError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                account: from.to_string(),
                needed: amount,
                available,
            });
        }
        if from == to || amount == 0 {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.balances.insert(from.clone(), available - amount);
        self.balances.insert(to.clone(), credited);
        Ok(())
    }
}

impl TokenLedger for StandardToken {
    fn total_supply(&self) -> u128 {
        self.total_supply
    }

    fn balance_of(&self, account: &Account) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Account, spender: &Account) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|m| m.get(spender))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&mut self, from: &Account, to: &Account, amount: u128) -> Result<(), TokenError> {
        self.move_balance(from, to, amount)?;
        tracing::trace!(%from, %to, amount, "transfer");
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Account,
        from: &Account,
        to: &Account,
        amount: u128,
    ) -> Result<(), TokenError> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(TokenError::InsufficientAllowance {
                owner: from.to_string(),
                spender: spender.to_string(),
                needed: amount,
                available: allowed,
            });
        }
        self.move_balance(from, to, amount)?;
        if allowed != u128::MAX {
            self.allowances
                .entry(from.clone())
                .or_default()
                .insert(spender.clone(), allowed - amount);
        }
        tracing::trace!(%spender, %from, %to, amount, "transfer_from");
        Ok(())
    }

    fn approve(&mut self, owner: &Account, spender: &Account, amount: u128) -> Result<(), TokenError> {
        self.allowances
            .entry(owner.clone())
            .or_default()
            .insert(spender.clone(), amount);
        tracing::trace!(%owner, %spender, amount, "approve");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded() -> (StandardToken, Account, Account) {
        let mut token = StandardToken::new("Test Token", "TST", 18);
        let alice = Account::new("alice");
        let bob = Account::new("bob");
        token.mint(&alice, 1_000).unwrap();
        (token, alice, bob)
    }

    #[test]
    fn mint_tracks_supply() {
        let (token, alice, _) = funded();
        assert_eq!(token.total_supply(), 1_000);
        assert_eq!(token.balance_of(&alice), 1_000);
    }

    #[test]
    fn transfer_moves_balance() {
        let (mut token, alice, bob) = funded();
        token.transfer(&alice, &bob, 300).unwrap();
        assert_eq!(token.balance_of(&alice), 700);
        assert_eq!(token.balance_of(&bob), 300);
    }

    #[test]
    fn transfer_insufficient_balance_leaves_state() {
        let (mut token, alice, bob) = funded();
        let err = token.transfer(&alice, &bob, 1_001).unwrap_err();
        assert!(matches!(err, TokenError::InsufficientBalance { needed: 1_001, available: 1_000, .. }));
        assert_eq!(token.balance_of(&alice), 1_000);
        assert_eq!(token.balance_of(&bob), 0);
    }

    #[test]
    fn transfer_from_consumes_allowance() {
        let (mut token, alice, bob) = funded();
        let spender = Account::escrow("registry");
        token.approve(&alice, &spender, 500).unwrap();
        token.transfer_from(&spender, &alice, &bob, 200).unwrap();
        assert_eq!(token.allowance(&alice, &spender), 300);
        assert_eq!(token.balance_of(&bob), 200);
    }

    #[test]
    fn transfer_from_without_allowance_fails() {
        let (mut token, alice, bob) = funded();
        let spender = Account::escrow("registry");
        let err = token.transfer_from(&spender, &alice, &bob, 1).unwrap_err();
        assert!(matches!(err, TokenError::InsufficientAllowance { .. }));
        assert_eq!(token.balance_of(&alice), 1_000);
    }

    #[test]
    fn allowance_exceeding_balance_does_not_debit() {
        let (mut token, alice, bob) = funded();
        let spender = Account::escrow("registry");
        token.approve(&alice, &spender, 5_000).unwrap();
        assert!(token.transfer_from(&spender, &alice, &bob, 2_000).is_err());
        assert_eq!(token.allowance(&alice, &spender), 5_000);
    }

    #[test]
    fn unlimited_allowance_is_not_decremented() {
        let (mut token, alice, bob) = funded();
        let spender = Account::escrow("registry");
        token.approve(&alice, &spender, u128::MAX).unwrap();
        token.transfer_from(&spender, &alice, &bob, 10).unwrap();
        assert_eq!(token.allowance(&alice, &spender), u128::MAX);
    }

    #[test]
    fn batch_checks_total_before_moving() {
        let (mut token, alice, bob) = funded();
        let carol = Account::new("carol");
        let err = token
            .transfer_batch(&alice, &[(bob.clone(), 600), (carol.clone(), 600)])
            .unwrap_err();
        assert!(matches!(err, TokenError::InsufficientBalance { needed: 1_200, .. }));
        assert_eq!(token.balance_of(&bob), 0);

        token
            .transfer_batch(&alice, &[(bob.clone(), 600), (carol.clone(), 400)])
            .unwrap();
        assert_eq!(token.balance_of(&alice), 0);
        assert_eq!(token.balance_of(&carol), 400);
    }
}
