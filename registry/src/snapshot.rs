//! Persisted registry state.

use serde::{Deserialize, Serialize};
use tcr_types::Account;
use tcr_voting::VotingSnapshot;

use crate::challenge::Challenge;
use crate::error::RegistryError;
use crate::listing::{Listing, SubjectListing};
use crate::subjects::SubjectEntry;

/// Serializable snapshot of every registry record and poll.
///
/// Collections are flattened to vectors so the snapshot encodes with both
/// bincode and JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub escrow: Account,
    pub subjects: Vec<SubjectEntry>,
    pub listings: Vec<Listing>,
    pub pairings: Vec<SubjectListing>,
    pub challenges: Vec<Challenge>,
    pub voting: VotingSnapshot,
}

impl RegistrySnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, RegistryError> {
        bincode::serialize(self).map_err(|e| RegistryError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RegistryError> {
        bincode::deserialize(bytes).map_err(|e| RegistryError::Serialization(e.to_string()))
    }
}
