use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("parameter {0} is not set")]
    Missing(String),

    #[error("unknown parameter key: {0}")]
    UnknownKey(String),

    #[error("parameter {key} = {value} is out of range (max {max})")]
    OutOfRange { key: String, value: u128, max: u128 },

    #[error("config error: {0}")]
    Config(String),
}
