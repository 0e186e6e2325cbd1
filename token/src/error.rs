use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("insufficient balance in {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: String,
        needed: u128,
        available: u128,
    },

    #[error("insufficient allowance for {spender} on {owner}: need {needed}, have {available}")]
    InsufficientAllowance {
        owner: String,
        spender: String,
        needed: u128,
        available: u128,
    },

    #[error("arithmetic overflow in token ledger")]
    Overflow,

    #[error("ledger rejected the call: {0}")]
    Rejected(String),
}
