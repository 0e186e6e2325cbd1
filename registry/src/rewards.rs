//! Reward arithmetic for resolved challenges.
//!
//! A challenge locks `stake` from each side. The loser's stake is split: the
//! dispensation percentage goes to the winning party on top of their own
//! stake, the remainder forms the pool shared by voters on the winning side.
//! All functions are pure and return `None` on overflow.

use tcr_types::mul_div;

/// Voter pool carved out of the loser's stake:
/// `stake * (100 - dispensation_pct) / 100`, rounded down.
pub fn challenge_reward_pool(stake: u128, dispensation_pct: u8) -> Option<u128> {
    let keep = 100 - dispensation_pct.min(100) as u128;
    mul_div(stake, keep, 100)
}

/// What the winning party receives from the locked stakes.
///
/// Both stakes minus the voter pool. When no tokens were revealed for the
/// winning side there is nobody to share with, so the winner takes both
/// stakes.
pub fn winner_reward(stake: u128, reward_pool: u128, winning_tokens: u128) -> Option<u128> {
    let both = stake.checked_mul(2)?;
    if winning_tokens == 0 {
        Some(both)
    } else {
        both.checked_sub(reward_pool)
    }
}

/// A voter's share of the remaining pool, proportional to the tokens they
/// revealed for the winning side: `voter_tokens * pool / winning_tokens`,
/// rounded down.
///
/// Callers decrement both `pool` and `winning_tokens` after each claim, so the
/// last claimer receives exactly what is left.
pub fn voter_share(voter_tokens: u128, reward_pool: u128, winning_tokens: u128) -> Option<u128> {
    if voter_tokens > winning_tokens {
        return None;
    }
    mul_div(voter_tokens, reward_pool, winning_tokens)
}
