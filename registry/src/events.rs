//! Events emitted by the registry for callers to observe.

use serde::{Deserialize, Serialize};
use tcr_types::{Account, ListingHash, PollId, SubjectHash};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// A listing was applied for under a subject.
    Application {
        listing: ListingHash,
        subject: SubjectHash,
        applicant: Account,
        deposit: u128,
        application_end: u64,
        data: String,
    },
    /// A pairing was challenged and a poll opened.
    Challenge {
        listing: ListingHash,
        subject: SubjectHash,
        challenger: Account,
        challenge_id: PollId,
        commit_end: u64,
        reveal_end: u64,
        data: String,
    },
    Deposit {
        listing: ListingHash,
        subject: SubjectHash,
        added: u128,
        new_total: u128,
    },
    Withdrawal {
        listing: ListingHash,
        subject: SubjectHash,
        withdrawn: u128,
        new_total: u128,
    },
    /// An unchallenged application passed its apply stage.
    ApplicationWhitelisted {
        listing: ListingHash,
        subject: SubjectHash,
    },
    /// A pairing lost its challenge and was delisted.
    ListingRemoved {
        listing: ListingHash,
        subject: SubjectHash,
        refunded: u128,
    },
    /// The owner exited a whitelisted pairing.
    ListingWithdrawn {
        listing: ListingHash,
        subject: SubjectHash,
        refunded: u128,
    },
    /// A challenge found the deposit below the minimum and delisted the
    /// pairing without opening a poll.
    TouchAndRemoved {
        listing: ListingHash,
        subject: SubjectHash,
        refunded: u128,
    },
    /// The applicant won.
    ChallengeFailed {
        listing: ListingHash,
        subject: SubjectHash,
        challenge_id: PollId,
        reward_pool: u128,
        winning_tokens: u128,
    },
    /// The challenger won.
    ChallengeSucceeded {
        listing: ListingHash,
        subject: SubjectHash,
        challenge_id: PollId,
        reward_pool: u128,
        winning_tokens: u128,
    },
    RewardClaimed {
        challenge_id: PollId,
        voter: Account,
        reward: u128,
    },
    SubjectAdded {
        subject: SubjectHash,
        name: String,
    },
}
