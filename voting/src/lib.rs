//! Commit-reveal voting.
//!
//! Three phases per poll:
//! 1. **Commit**: voters lock tokens behind `hash(option, salt)`.
//! 2. **Reveal**: voters disclose option and salt; matching reveals add their
//!    locked tokens to the "for" or "against" tally.
//! 3. **Ended**: tallies are read-only, `is_passed` is defined, and every voter
//!    may withdraw their locked tokens.
//!
//! Voters never forfeit locked tokens. Unrevealed commitments count toward
//! neither side and earn nothing.

pub mod engine;
pub mod error;
pub mod poll;

pub use engine::{VotingEngine, VotingSnapshot};
pub use error::VotingError;
pub use poll::{quorum_met, Commitment, Poll, PollSchedule, VoteOption};
