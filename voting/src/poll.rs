//! Poll records and their phase windows.

use crate::error::VotingError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tcr_types::{mul_ge, Account, PollId, SecretHash, Timestamp};

/// A revealed vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteOption {
    /// Against the listing (supports the challenger). Encoded as 0.
    Against,
    /// For the listing (supports the applicant). Encoded as 1.
    For,
}

impl VoteOption {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Against => 0,
            Self::For => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Against),
            1 => Some(Self::For),
            _ => None,
        }
    }
}

/// A voter's hidden choice and the tokens locked behind it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub secret_hash: SecretHash,
    pub locked_tokens: u128,
}

/// Phase boundaries of a poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSchedule {
    pub commit_end_date: Timestamp,
    pub reveal_end_date: Timestamp,
}

impl PollSchedule {
    /// Commit phase of `commit_secs` from `now`, then a reveal phase of `reveal_secs`.
    pub fn new(now: Timestamp, commit_secs: u64, reveal_secs: u64) -> Result<Self, VotingError> {
        let commit_end_date = now.checked_add_secs(commit_secs).ok_or(VotingError::Overflow)?;
        let reveal_end_date = commit_end_date
            .checked_add_secs(reveal_secs)
            .ok_or(VotingError::Overflow)?;
        Ok(Self {
            commit_end_date,
            reveal_end_date,
        })
    }
}

/// A single commit-reveal poll.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub commit_end_date: Timestamp,
    pub reveal_end_date: Timestamp,
    /// Percentage (0–100) of revealed tokens that must vote "for" to pass.
    pub vote_quorum: u8,
    pub votes_for: u128,
    pub votes_against: u128,
    pub commitments: HashMap<Account, Commitment>,
    /// Voters who revealed, with the option they revealed.
    pub revealed: HashMap<Account, VoteOption>,
    /// Voters whose locked tokens have been released.
    pub withdrawn: HashSet<Account>,
}

impl Poll {
    pub fn new(id: PollId, schedule: PollSchedule, vote_quorum: u8) -> Self {
        Self {
            id,
            commit_end_date: schedule.commit_end_date,
            reveal_end_date: schedule.reveal_end_date,
            vote_quorum,
            votes_for: 0,
            votes_against: 0,
            commitments: HashMap::new(),
            revealed: HashMap::new(),
            withdrawn: HashSet::new(),
        }
    }

    pub fn commit_period_active(&self, now: Timestamp) -> bool {
        now < self.commit_end_date
    }

    pub fn reveal_period_active(&self, now: Timestamp) -> bool {
        self.commit_end_date <= now && now < self.reveal_end_date
    }

    pub fn has_ended(&self, now: Timestamp) -> bool {
        now >= self.reveal_end_date
    }

    /// Whether the revealed tallies meet quorum. Ignores the clock; callers
    /// gate on [`has_ended`](Self::has_ended).
    pub fn tally_passes(&self) -> bool {
        quorum_met(self.votes_for, self.votes_against, self.vote_quorum)
    }

    pub fn winning_option(&self) -> VoteOption {
        if self.tally_passes() {
            VoteOption::For
        } else {
            VoteOption::Against
        }
    }

    /// Tokens revealed for the winning option.
    pub fn winning_tokens(&self) -> u128 {
        match self.winning_option() {
            VoteOption::For => self.votes_for,
            VoteOption::Against => self.votes_against,
        }
    }

    /// Tokens still held in escrow for this poll.
    pub fn locked_total(&self) -> u128 {
        self.commitments
            .iter()
            .filter(|(voter, _)| !self.withdrawn.contains(*voter))
            .map(|(_, c)| c.locked_tokens)
            .sum()
    }
}

/// The quorum rule: `votes_for * 100 >= (votes_for + votes_against) * quorum`.
///
/// Compared exactly on widened products, so there is no rounding. With no
/// revealed tokens on either side the poll fails.
pub fn quorum_met(votes_for: u128, votes_against: u128, vote_quorum: u8) -> bool {
    if votes_for == 0 && votes_against == 0 {
        return false;
    }
    // for*100 >= (for + against)*q  <=>  for*(100 - q) >= against*q
    let q = vote_quorum.min(100) as u128;
    mul_ge(votes_for, 100 - q, votes_against, q)
}
