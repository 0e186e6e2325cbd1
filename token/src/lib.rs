//! The fungible token ledger the registry stakes against.
//!
//! The registry and the voting engine depend only on the [`TokenLedger`]
//! trait. [`StandardToken`] is the in-memory implementation with standard
//! balance/allowance semantics used by the CLI simulator and by tests.

pub mod error;
pub mod ledger;
pub mod standard;

pub use error::TokenError;
pub use ledger::TokenLedger;
pub use standard::StandardToken;
