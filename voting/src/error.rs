use tcr_token::TokenError;
use tcr_types::PollId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VotingError {
    #[error("poll {0} not found")]
    PollNotFound(PollId),

    #[error("commit phase of poll {0} is closed")]
    CommitPhaseClosed(PollId),

    #[error("reveal phase of poll {0} is not open")]
    RevealPhaseClosed(PollId),

    #[error("poll {poll_id} has not ended: reveal phase runs until {reveal_end}")]
    NotReady { poll_id: PollId, reveal_end: u64 },

    #[error("must commit a non-zero number of tokens")]
    ZeroTokens,

    #[error("secret hash must not be zero")]
    InvalidSecret,

    #[error("{voter} has no commitment in poll {poll_id}")]
    NoCommitment { voter: String, poll_id: PollId },

    #[error("{0} has already revealed")]
    DoubleReveal(String),

    #[error("reveal by {0} does not match the committed secret")]
    RevealMismatch(String),

    #[error("{0} has already withdrawn their tokens")]
    AlreadyWithdrawn(String),

    #[error("arithmetic overflow in vote tally")]
    Overflow,

    #[error("token transfer failed: {0}")]
    TransferFailed(#[from] TokenError),
}
