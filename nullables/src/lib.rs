//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator of the registry (clock, token ledger, parameter store)
//! sits behind a trait. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically, including injected failures
//! - Never touch the filesystem, the network or the system clock
//!
//! Usage: hand nullables to the registry in tests and keep an `Rc` to the
//! clock or parameters to steer them between calls.

pub mod clock;
pub mod ledger;
pub mod params;

pub use clock::NullClock;
pub use ledger::NullLedger;
pub use params::NullParams;
