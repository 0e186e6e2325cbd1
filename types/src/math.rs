//! Exact 256-bit intermediate arithmetic on `u128` token amounts.
//!
//! Reward splits multiply two token amounts before dividing, and quorum checks
//! compare products of a tally and a percentage. With 18-decimal tokens either
//! product can exceed `u128`, so both go through a widened product.

/// Full 256-bit product of `a * b`, returned as `(high, low)` halves.
pub fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = u64::MAX as u128;
    let (a_lo, a_hi) = (a & MASK, a >> 64);
    let (b_lo, b_hi) = (b & MASK, b >> 64);

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    // Each term is < 2^64, so the sum fits comfortably.
    let cross = (ll >> 64) + (lh & MASK) + (hl & MASK);
    let low = (ll & MASK) | (cross << 64);
    let high = hh + (lh >> 64) + (hl >> 64) + (cross >> 64);
    (high, low)
}

/// `floor(a * b / c)` computed exactly.
///
/// Returns `None` when `c == 0` or the quotient does not fit in `u128`.
pub fn mul_div(a: u128, b: u128, c: u128) -> Option<u128> {
    if c == 0 {
        return None;
    }
    let (high, low) = widening_mul(a, b);
    if high == 0 {
        return Some(low / c);
    }
    if high >= c {
        return None;
    }

    // Restoring long division of the 256-bit dividend; the remainder stays < c.
    let mut rem = high;
    let mut quot: u128 = 0;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((low >> i) & 1);
        quot <<= 1;
        if carry == 1 || rem >= c {
            rem = rem.wrapping_sub(c);
            quot |= 1;
        }
    }
    Some(quot)
}

/// `a * b >= c * d`, compared without overflow.
pub fn mul_ge(a: u128, b: u128, c: u128, d: u128) -> bool {
    widening_mul(a, b) >= widening_mul(c, d)
}
