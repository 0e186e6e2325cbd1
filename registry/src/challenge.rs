//! Challenge records, keyed by the id of the poll that decides them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tcr_types::{Account, ListingHash, PollId, SubjectHash};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: PollId,
    pub challenger: Account,
    pub listing_hash: ListingHash,
    pub subject_hash: SubjectHash,
    /// Tokens staked by each side.
    pub stake: u128,
    /// Tokens reserved for winning voters; decremented as they claim.
    pub reward_pool: u128,
    pub resolved: bool,
    /// Winning-side tokens not yet claimed against the pool.
    pub winning_tokens: u128,
    /// Voters who have claimed their share.
    pub claims: HashSet<Account>,
}

impl Challenge {
    pub fn new(
        id: PollId,
        challenger: Account,
        listing_hash: ListingHash,
        subject_hash: SubjectHash,
        stake: u128,
        reward_pool: u128,
    ) -> Self {
        Self {
            id,
            challenger,
            listing_hash,
            subject_hash,
            stake,
            reward_pool,
            resolved: false,
            winning_tokens: 0,
            claims: HashSet::new(),
        }
    }

    pub fn has_claimed(&self, voter: &Account) -> bool {
        self.claims.contains(voter)
    }

    /// Tokens the registry escrow still holds on behalf of this challenge:
    /// both stakes while open, the unclaimed pool once resolved.
    pub fn escrowed(&self) -> u128 {
        if self.resolved {
            self.reward_pool
        } else {
            self.stake.saturating_mul(2)
        }
    }
}
