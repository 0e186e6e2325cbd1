//! Ledger account identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An account on the token ledger.
///
/// Accounts are opaque strings. Escrow accounts owned by the registry and the
/// voting engine carry the `escrow:` prefix so they can never collide with a
/// participant name chosen by a client.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Account(String);

impl Account {
    /// Prefix reserved for contract-owned escrow accounts.
    pub const ESCROW_PREFIX: &'static str = "escrow:";

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Build the escrow account for a named component.
    pub fn escrow(label: &str) -> Self {
        Self(format!("{}{}", Self::ESCROW_PREFIX, label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_escrow(&self) -> bool {
        self.0.starts_with(Self::ESCROW_PREFIX)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Account {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Account {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
