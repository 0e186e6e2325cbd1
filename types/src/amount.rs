//! Token amounts.
//!
//! Amounts are plain `u128` raw units (18 decimals) so every split is exact
//! integer arithmetic. The smallest unit is 1 raw.

/// Raw units per whole token (10^18).
pub const TOKEN_UNIT: u128 = 1_000_000_000_000_000_000;

/// Convert whole tokens to raw units.
///
/// Saturates at `u128::MAX`; callers use this for configuration and tests,
/// never for ledger arithmetic.
pub const fn tokens(whole: u128) -> u128 {
    whole.saturating_mul(TOKEN_UNIT)
}
