//! Listing records: the per-subject pairing and the listing-wide aggregate.

use serde::{Deserialize, Serialize};
use tcr_types::{Account, ListingHash, PollId, SubjectHash, Timestamp};

/// Where a pairing stands in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingStatus {
    /// Applied, apply stage still running.
    Pending,
    /// Apply stage over without a challenge; waiting for `update_status`.
    Whitelistable,
    /// Under an active challenge.
    Challenged,
    Whitelisted,
    /// Delisted by a lost challenge, an exit or an underfunded touch. The
    /// record is kept; a new application replaces it.
    Removed,
}

/// A listing filed under one subject. Economics and whitelist status are
/// tracked independently for every subject a listing is filed under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectListing {
    pub listing_hash: ListingHash,
    pub subject_hash: SubjectHash,
    pub owner: Account,
    pub application_expiry: Timestamp,
    pub whitelisted: bool,
    /// Deposit not currently locked by a challenge.
    pub unstaked_deposit: u128,
    /// Poll id of the active challenge, 0 if none.
    pub challenge_id: PollId,
    /// Poll id of the last challenge resolved on this pairing, 0 if none.
    pub resolved_challenge_id: PollId,
    pub removed: bool,
}

impl SubjectListing {
    pub fn is_challenged(&self) -> bool {
        self.challenge_id != 0
    }

    /// Clear the record after delisting. Tokens must already have left it.
    pub fn delist(&mut self) {
        self.whitelisted = false;
        self.unstaked_deposit = 0;
        self.challenge_id = 0;
        self.removed = true;
    }

    pub fn status(&self, now: Timestamp) -> ListingStatus {
        if self.removed {
            ListingStatus::Removed
        } else if self.is_challenged() {
            ListingStatus::Challenged
        } else if self.whitelisted {
            ListingStatus::Whitelisted
        } else if self.application_expiry.has_passed(now) {
            ListingStatus::Whitelistable
        } else {
            ListingStatus::Pending
        }
    }
}

/// Listing-wide view, recomputed from the listing's pairings after every
/// mutation. Tokens are held on the pairings; `unstaked_deposit` here is
/// their sum. Removed pairings stay in `subjects` but give up ownership.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub listing_hash: ListingHash,
    pub owner: Account,
    pub application_expiry: Timestamp,
    pub whitelisted: bool,
    pub unstaked_deposit: u128,
    /// Most recently opened active challenge across the pairings, 0 if none.
    pub challenge_id: PollId,
    /// Subject of the most recent application.
    pub primary_subject: SubjectHash,
    /// Subjects the listing is filed under, oldest application first.
    pub subjects: Vec<SubjectHash>,
    /// Every pairing has been removed.
    pub removed: bool,
}

impl Listing {
    /// Aggregate `pairings`, given oldest application first. `None` when the
    /// listing has no pairings left.
    pub fn from_pairings(listing_hash: ListingHash, pairings: &[&SubjectListing]) -> Option<Self> {
        let primary = pairings.last()?;
        let owner = pairings
            .iter()
            .rev()
            .find(|p| !p.removed)
            .unwrap_or(primary)
            .owner
            .clone();
        Some(Self {
            listing_hash,
            owner,
            application_expiry: primary.application_expiry,
            whitelisted: pairings.iter().any(|p| p.whitelisted),
            unstaked_deposit: pairings
                .iter()
                .fold(0u128, |acc, p| acc.saturating_add(p.unstaked_deposit)),
            challenge_id: pairings.iter().map(|p| p.challenge_id).max().unwrap_or(0),
            primary_subject: primary.subject_hash,
            subjects: pairings.iter().map(|p| p.subject_hash).collect(),
            removed: pairings.iter().all(|p| p.removed),
        })
    }
}
