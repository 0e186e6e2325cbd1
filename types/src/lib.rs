//! Fundamental types for the token-curated registry.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! accounts, record hashes, poll identifiers, timestamps and the clock seam,
//! token units, and the exact wide arithmetic used for reward and quorum math.

pub mod account;
pub mod amount;
pub mod hash;
pub mod math;
pub mod time;

pub use account::Account;
pub use amount::{tokens, TOKEN_UNIT};
pub use hash::{ListingHash, SecretHash, SubjectHash};
pub use math::{mul_div, mul_ge, widening_mul};
pub use time::{Clock, Timestamp};

/// Identifier of a poll (and of the challenge that opened it).
///
/// Allocated sequentially from 1. Zero means "no active challenge".
pub type PollId = u64;
