//! Hashing primitives for the token-curated registry.
//!
//! - **Blake2b-256** for content-derived listing and subject identifiers
//! - Vote commitments binding an option and a salt for commit-reveal polls

pub mod hash;

pub use hash::{blake2b_256, blake2b_256_multi, listing_hash, subject_hash, vote_secret_hash};
