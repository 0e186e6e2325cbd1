//! All parameter keys the store recognises.

use crate::error::ParamError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Enum of every named constant held by the parameter store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParamKey {
    // Registry
    MinDeposit,
    ApplyStageLength,
    CommitStageLength,
    RevealStageLength,
    DispensationPct,
    VoteQuorum,

    // Parameter-store governance
    PMinDeposit,
    PApplyStageLength,
    PCommitStageLength,
    PRevealStageLength,
    PDispensationPct,
    PVoteQuorum,
}

impl ParamKey {
    pub const ALL: [ParamKey; 12] = [
        Self::MinDeposit,
        Self::ApplyStageLength,
        Self::CommitStageLength,
        Self::RevealStageLength,
        Self::DispensationPct,
        Self::VoteQuorum,
        Self::PMinDeposit,
        Self::PApplyStageLength,
        Self::PCommitStageLength,
        Self::PRevealStageLength,
        Self::PDispensationPct,
        Self::PVoteQuorum,
    ];

    /// Canonical key name as read by `get`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MinDeposit => "minDeposit",
            Self::ApplyStageLength => "applyStageLength",
            Self::CommitStageLength => "commitStageLength",
            Self::RevealStageLength => "revealStageLength",
            Self::DispensationPct => "dispensationPct",
            Self::VoteQuorum => "voteQuorum",
            Self::PMinDeposit => "pMinDeposit",
            Self::PApplyStageLength => "pApplyStageLength",
            Self::PCommitStageLength => "pCommitStageLength",
            Self::PRevealStageLength => "pRevealStageLength",
            Self::PDispensationPct => "pDispensationPct",
            Self::PVoteQuorum => "pVoteQuorum",
        }
    }

    /// Upper bound for percentage keys; `None` for unbounded amounts and lengths.
    pub fn max_value(&self) -> Option<u128> {
        match self {
            Self::DispensationPct | Self::VoteQuorum | Self::PDispensationPct | Self::PVoteQuorum => {
                Some(100)
            }
            _ => None,
        }
    }

    /// Validate a candidate value for this key.
    pub fn check(&self, value: u128) -> Result<u128, ParamError> {
        match self.max_value() {
            Some(max) if value > max => Err(ParamError::OutOfRange {
                key: self.name().to_string(),
                value,
                max,
            }),
            _ => Ok(value),
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamKey {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| ParamError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for key in ParamKey::ALL {
            assert_eq!(key.name().parse::<ParamKey>().unwrap(), key);
        }
    }

    #[test]
    fn unknown_key_rejected() {
        assert_eq!(
            "minDepositt".parse::<ParamKey>(),
            Err(ParamError::UnknownKey("minDepositt".into()))
        );
    }

    #[test]
    fn percentages_are_bounded() {
        assert!(ParamKey::VoteQuorum.check(100).is_ok());
        assert!(ParamKey::VoteQuorum.check(101).is_err());
        assert!(ParamKey::MinDeposit.check(u128::MAX).is_ok());
    }
}
