//! Parameter configuration with TOML file support.
//!
//! Keys use the canonical camelCase names. Token amounts above `i64::MAX`
//! (10 tokens at 18 decimals already is) cannot be TOML integers, so amounts
//! accept either an integer or a decimal string.

use crate::error::ParamError;
use crate::key::ParamKey;
use crate::store::StaticParameterStore;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tcr_types::tokens;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ParamsConfig {
    #[serde(default = "default_min_deposit", with = "serde_amount")]
    pub min_deposit: u128,
    #[serde(default = "default_p_min_deposit", with = "serde_amount")]
    pub p_min_deposit: u128,
    #[serde(default = "default_stage_length")]
    pub apply_stage_length: u64,
    #[serde(default = "default_p_stage_length")]
    pub p_apply_stage_length: u64,
    #[serde(default = "default_stage_length")]
    pub commit_stage_length: u64,
    #[serde(default = "default_p_stage_length")]
    pub p_commit_stage_length: u64,
    #[serde(default = "default_stage_length")]
    pub reveal_stage_length: u64,
    #[serde(default = "default_p_stage_length")]
    pub p_reveal_stage_length: u64,
    #[serde(default = "default_pct")]
    pub dispensation_pct: u8,
    #[serde(default = "default_pct")]
    pub p_dispensation_pct: u8,
    #[serde(default = "default_pct")]
    pub vote_quorum: u8,
    #[serde(default = "default_pct")]
    pub p_vote_quorum: u8,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_min_deposit() -> u128 {
    tokens(10)
}

fn default_p_min_deposit() -> u128 {
    tokens(100)
}

fn default_stage_length() -> u64 {
    10
}

fn default_p_stage_length() -> u64 {
    20
}

fn default_pct() -> u8 {
    50
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            min_deposit: default_min_deposit(),
            p_min_deposit: default_p_min_deposit(),
            apply_stage_length: default_stage_length(),
            p_apply_stage_length: default_p_stage_length(),
            commit_stage_length: default_stage_length(),
            p_commit_stage_length: default_p_stage_length(),
            reveal_stage_length: default_stage_length(),
            p_reveal_stage_length: default_p_stage_length(),
            dispensation_pct: default_pct(),
            p_dispensation_pct: default_pct(),
            vote_quorum: default_pct(),
            p_vote_quorum: default_pct(),
        }
    }
}

impl ParamsConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ParamError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ParamError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ParamError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ParamError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        for (key, value) in self.pairs() {
            key.check(value)?;
        }
        Ok(())
    }

    /// Every key with its configured value.
    pub fn pairs(&self) -> [(ParamKey, u128); 12] {
        [
            (ParamKey::MinDeposit, self.min_deposit),
            (ParamKey::ApplyStageLength, self.apply_stage_length as u128),
            (ParamKey::CommitStageLength, self.commit_stage_length as u128),
            (ParamKey::RevealStageLength, self.reveal_stage_length as u128),
            (ParamKey::DispensationPct, self.dispensation_pct as u128),
            (ParamKey::VoteQuorum, self.vote_quorum as u128),
            (ParamKey::PMinDeposit, self.p_min_deposit),
            (ParamKey::PApplyStageLength, self.p_apply_stage_length as u128),
            (ParamKey::PCommitStageLength, self.p_commit_stage_length as u128),
            (ParamKey::PRevealStageLength, self.p_reveal_stage_length as u128),
            (ParamKey::PDispensationPct, self.p_dispensation_pct as u128),
            (ParamKey::PVoteQuorum, self.p_vote_quorum as u128),
        ]
    }

    pub fn to_store(&self) -> Result<StaticParameterStore, ParamError> {
        let mut store = StaticParameterStore::empty();
        for (key, value) in self.pairs() {
            store.set(key, value)?;
        }
        Ok(store)
    }
}

/// Serde adapter for `u128` token amounts: integer or decimal string in,
/// decimal string out. Underscores are accepted as digit separators.
pub mod serde_amount {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Int(u64),
        Str(String),
    }

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Int(v) => Ok(v as u128),
            Repr::Str(s) => s
                .replace('_', "")
                .parse::<u128>()
                .map_err(|e| D::Error::custom(format!("invalid amount {s:?}: {e}"))),
        }
    }
}
