//! Registry parameters.
//!
//! The registry never owns its tunable constants; it reads the current value
//! of each named key from a [`ParameterStore`] on every call. How values change
//! (e.g. a parameterizer that is itself a TCR) is outside this workspace.
//! Each key has a `p`-prefixed counterpart used for governing the parameter
//! store itself; the registry reads only the unprefixed keys.

pub mod config;
pub mod error;
pub mod key;
pub mod store;

pub use config::ParamsConfig;
pub use error::ParamError;
pub use key::ParamKey;
pub use store::{ParameterStore, RegistryParams, StaticParameterStore};
