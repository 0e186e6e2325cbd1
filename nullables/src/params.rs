//! Nullable parameter store with values settable between registry calls.

use std::cell::RefCell;
use std::collections::HashMap;
use tcr_params::{ParamError, ParamKey, ParameterStore, StaticParameterStore};

/// Parameter store whose values can be changed through a shared reference,
/// so a test holding an `Rc` can retune a registry mid-scenario.
///
/// Values are not range-checked, so tests can feed the registry anything.
pub struct NullParams {
    values: RefCell<HashMap<ParamKey, u128>>,
}

impl NullParams {
    /// Start from the reference deployment defaults.
    pub fn new() -> Self {
        Self {
            values: RefCell::new(StaticParameterStore::defaults().entries().into_iter().collect()),
        }
    }

    pub fn empty() -> Self {
        Self {
            values: RefCell::new(HashMap::new()),
        }
    }

    pub fn set(&self, key: ParamKey, value: u128) {
        self.values.borrow_mut().insert(key, value);
    }

    pub fn unset(&self, key: ParamKey) {
        self.values.borrow_mut().remove(&key);
    }
}

impl Default for NullParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterStore for NullParams {
    fn get(&self, key: ParamKey) -> Result<u128, ParamError> {
        self.values
            .borrow()
            .get(&key)
            .copied()
            .ok_or_else(|| ParamError::Missing(key.name().to_string()))
    }
}
