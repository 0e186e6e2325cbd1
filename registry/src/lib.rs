//! Token-curated registry.
//!
//! Token holders curate a whitelist of listings filed under subjects:
//! 1. **Application**: an applicant stakes at least the minimum deposit on a
//!    listing/subject pairing. Unchallenged, it is whitelisted once the apply
//!    stage ends.
//! 2. **Challenge**: anyone may stake the minimum deposit against a pending or
//!    whitelisted pairing, opening a commit-reveal poll.
//! 3. **Resolution**: once the poll ends, the winning party takes both stakes
//!    minus the voter pool; the pool is shared by voters on the winning side.
//!
//! Tokens move through a [`tcr_token::TokenLedger`]; parameters are read from a
//! [`tcr_params::ParameterStore`] on every call; deadlines are compared
//! against an injected [`tcr_types::Clock`].

pub mod challenge;
pub mod error;
pub mod events;
pub mod listing;
pub mod registry;
pub mod rewards;
pub mod snapshot;
pub mod subjects;

pub use challenge::Challenge;
pub use error::RegistryError;
pub use events::RegistryEvent;
pub use listing::{Listing, ListingStatus, SubjectListing};
pub use registry::{Registry, REGISTRY_ESCROW, VOTING_ESCROW};
pub use snapshot::RegistrySnapshot;
pub use subjects::{SubjectBook, SubjectEntry};
