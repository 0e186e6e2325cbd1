//! Blake2b hashing for record identifiers and vote commitments.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use tcr_types::{ListingHash, SecretHash, SubjectHash};

type Blake2b256 = Blake2b<U32>;

/// Domain tag mixed into every vote commitment.
const VOTE_DOMAIN: &[u8] = b"tcr-vote";

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Identifier of a listing name, e.g. `"nochallenge.net"`.
pub fn listing_hash(name: &str) -> ListingHash {
    ListingHash::new(blake2b_256(name.as_bytes()))
}

/// Identifier of a subject name, e.g. `"Algebra"`.
///
/// Same derivation as [`listing_hash`]; the distinct return type keeps the two
/// key spaces from being mixed up.
pub fn subject_hash(name: &str) -> SubjectHash {
    SubjectHash::new(blake2b_256(name.as_bytes()))
}

/// Commitment for a vote: `Blake2b-256("tcr-vote" ‖ option ‖ salt)`.
///
/// The salt is written big-endian into the low half of a 32-byte word so a
/// commitment is always over a fixed 41-byte message.
pub fn vote_secret_hash(option: u8, salt: u128) -> SecretHash {
    let mut salt_word = [0u8; 32];
    salt_word[16..].copy_from_slice(&salt.to_be_bytes());
    SecretHash::new(blake2b_256_multi(&[VOTE_DOMAIN, &[option], &salt_word]))
}
