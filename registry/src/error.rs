use tcr_params::ParamError;
use tcr_token::TokenError;
use tcr_types::{ListingHash, PollId, SubjectHash};
use tcr_voting::VotingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("insufficient stake: needed {needed}, provided {provided}")]
    InsufficientStake { needed: u128, provided: u128 },

    #[error("listing {listing} already applied under subject {subject}")]
    AlreadyApplied {
        listing: ListingHash,
        subject: SubjectHash,
    },

    #[error("listing {listing} under subject {subject} is already challenged (poll {poll_id})")]
    AlreadyChallenged {
        listing: ListingHash,
        subject: SubjectHash,
        poll_id: PollId,
    },

    #[error("listing {listing} under subject {subject} has nothing left to resolve")]
    AlreadyResolved {
        listing: ListingHash,
        subject: SubjectHash,
    },

    #[error("listing {listing} under subject {subject} is not ready: {reason}")]
    NotReady {
        listing: ListingHash,
        subject: SubjectHash,
        reason: &'static str,
    },

    #[error("listing {listing} under subject {subject} not found")]
    ListingNotFound {
        listing: ListingHash,
        subject: SubjectHash,
    },

    #[error("listing {0} not found")]
    UnknownListing(ListingHash),

    #[error("subject {0} is not registered")]
    UnknownSubject(SubjectHash),

    #[error("subject name must not be empty")]
    InvalidSubjectName,

    #[error("subject {0} already registered")]
    SubjectExists(SubjectHash),

    #[error("{caller} does not own listing {listing}")]
    NotOwner { caller: String, listing: ListingHash },

    #[error("listing {listing} under subject {subject} is not whitelisted")]
    NotWhitelisted {
        listing: ListingHash,
        subject: SubjectHash,
    },

    #[error("challenge {0} not found")]
    ChallengeNotFound(PollId),

    #[error("challenge {0} has not been resolved")]
    NotResolved(PollId),

    #[error("{voter} already claimed the reward of challenge {challenge_id}")]
    AlreadyClaimed { voter: String, challenge_id: PollId },

    #[error("{voter} has no reward in challenge {challenge_id}")]
    NoReward { voter: String, challenge_id: PollId },

    #[error("arithmetic overflow on token amount")]
    Overflow,

    #[error("token transfer failed: {0}")]
    TransferFailed(TokenError),

    #[error("voting error: {0}")]
    Voting(VotingError),

    #[error("parameter error: {0}")]
    Params(#[from] ParamError),

    #[error("snapshot serialization failed: {0}")]
    Serialization(String),
}

impl From<TokenError> for RegistryError {
    fn from(e: TokenError) -> Self {
        Self::TransferFailed(e)
    }
}

impl From<VotingError> for RegistryError {
    fn from(e: VotingError) -> Self {
        match e {
            VotingError::TransferFailed(inner) => Self::TransferFailed(inner),
            other => Self::Voting(other),
        }
    }
}
