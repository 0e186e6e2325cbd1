//! The parameter store seam and its static implementation.

use crate::error::ParamError;
use crate::key::ParamKey;
use std::collections::HashMap;
use tcr_types::tokens;

/// Read access to the current value of each named parameter.
pub trait ParameterStore {
    fn get(&self, key: ParamKey) -> Result<u128, ParamError>;
}

impl<P: ParameterStore + ?Sized> ParameterStore for &P {
    fn get(&self, key: ParamKey) -> Result<u128, ParamError> {
        (**self).get(key)
    }
}

impl<P: ParameterStore + ?Sized> ParameterStore for std::rc::Rc<P> {
    fn get(&self, key: ParamKey) -> Result<u128, ParamError> {
        (**self).get(key)
    }
}

/// A fixed table of parameter values.
#[derive(Clone, Debug)]
pub struct StaticParameterStore {
    values: HashMap<ParamKey, u128>,
}

impl StaticParameterStore {
    /// An empty store; every `get` fails until values are set.
    pub fn empty() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Reference deployment values.
    pub fn defaults() -> Self {
        let mut values = HashMap::new();
        values.insert(ParamKey::MinDeposit, tokens(10));
        values.insert(ParamKey::PMinDeposit, tokens(100));
        values.insert(ParamKey::ApplyStageLength, 10);
        values.insert(ParamKey::PApplyStageLength, 20);
        values.insert(ParamKey::CommitStageLength, 10);
        values.insert(ParamKey::PCommitStageLength, 20);
        values.insert(ParamKey::RevealStageLength, 10);
        values.insert(ParamKey::PRevealStageLength, 20);
        values.insert(ParamKey::DispensationPct, 50);
        values.insert(ParamKey::PDispensationPct, 50);
        values.insert(ParamKey::VoteQuorum, 50);
        values.insert(ParamKey::PVoteQuorum, 50);
        Self { values }
    }

    /// Set a value, validating percentage bounds.
    pub fn set(&mut self, key: ParamKey, value: u128) -> Result<(), ParamError> {
        self.values.insert(key, key.check(value)?);
        Ok(())
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: ParamKey, value: u128) -> Result<Self, ParamError> {
        self.set(key, value)?;
        Ok(self)
    }

    /// All set values, ordered by key.
    pub fn entries(&self) -> Vec<(ParamKey, u128)> {
        let mut entries: Vec<_> = self.values.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(k, _)| *k);
        entries
    }
}

impl Default for StaticParameterStore {
    fn default() -> Self {
        Self::defaults()
    }
}

impl ParameterStore for StaticParameterStore {
    fn get(&self, key: ParamKey) -> Result<u128, ParamError> {
        self.values
            .get(&key)
            .copied()
            .ok_or_else(|| ParamError::Missing(key.name().to_string()))
    }
}

/// The registry-facing parameters, read together at the start of a call so
/// every check within that call sees one consistent set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryParams {
    pub min_deposit: u128,
    pub apply_stage_length: u64,
    pub commit_stage_length: u64,
    pub reveal_stage_length: u64,
    pub dispensation_pct: u8,
    pub vote_quorum: u8,
}

impl RegistryParams {
    pub fn load<P: ParameterStore + ?Sized>(store: &P) -> Result<Self, ParamError> {
        Ok(Self {
            min_deposit: store.get(ParamKey::MinDeposit)?,
            apply_stage_length: seconds(store, ParamKey::ApplyStageLength)?,
            commit_stage_length: seconds(store, ParamKey::CommitStageLength)?,
            reveal_stage_length: seconds(store, ParamKey::RevealStageLength)?,
            dispensation_pct: percentage(store, ParamKey::DispensationPct)?,
            vote_quorum: percentage(store, ParamKey::VoteQuorum)?,
        })
    }
}

fn seconds<P: ParameterStore + ?Sized>(store: &P, key: ParamKey) -> Result<u64, ParamError> {
    let value = store.get(key)?;
    u64::try_from(value).map_err(|_| ParamError::OutOfRange {
        key: key.name().to_string(),
        value,
        max: u64::MAX as u128,
    })
}

fn percentage<P: ParameterStore + ?Sized>(store: &P, key: ParamKey) -> Result<u8, ParamError> {
    let value = key.check(store.get(key)?)?;
    // check() bounds percentages to 100
    Ok(value as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let store = StaticParameterStore::defaults();
        let params = RegistryParams::load(&store).unwrap();
        assert_eq!(params.min_deposit, 10_000_000_000_000_000_000);
        assert_eq!(params.apply_stage_length, 10);
        assert_eq!(params.commit_stage_length, 10);
        assert_eq!(params.reveal_stage_length, 10);
        assert_eq!(params.dispensation_pct, 50);
        assert_eq!(params.vote_quorum, 50);
        assert_eq!(store.get(ParamKey::PMinDeposit).unwrap(), tokens(100));
    }

    #[test]
    fn missing_key_is_reported() {
        let store = StaticParameterStore::empty();
        assert_eq!(
            RegistryParams::load(&store),
            Err(ParamError::Missing("minDeposit".into()))
        );
    }

    #[test]
    fn set_rejects_out_of_range_percentage() {
        let mut store = StaticParameterStore::defaults();
        assert!(store.set(ParamKey::DispensationPct, 101).is_err());
        assert_eq!(store.get(ParamKey::DispensationPct).unwrap(), 50);
    }

    #[test]
    fn stage_length_must_fit_seconds() {
        let store = StaticParameterStore::defaults()
            .with(ParamKey::CommitStageLength, u64::MAX as u128 + 1)
            .unwrap();
        assert!(matches!(
            RegistryParams::load(&store),
            Err(ParamError::OutOfRange { .. })
        ));
    }
}
