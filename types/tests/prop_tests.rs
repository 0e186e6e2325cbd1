use proptest::prelude::*;

use tcr_types::{mul_div, mul_ge, ListingHash, Timestamp};

proptest! {
    /// mul_div agrees with native arithmetic whenever the product fits.
    #[test]
    fn mul_div_matches_native(a in 0u128..u64::MAX as u128, b in 0u128..u64::MAX as u128, c in 1u128..u64::MAX as u128) {
        prop_assert_eq!(mul_div(a, b, c), Some(a * b / c));
    }

    /// floor(a*b/c) * c <= a*b < (floor(a*b/c) + 1) * c, checked in the widened domain.
    #[test]
    fn mul_div_is_floor(a in any::<u128>(), b in any::<u128>(), c in 1u128..) {
        if let Some(q) = mul_div(a, b, c) {
            prop_assert!(mul_ge(a, b, q, c));
            if let Some(next) = q.checked_add(1) {
                prop_assert!(!mul_ge(a, b, next, c));
            }
        }
    }

    /// mul_ge is consistent with native comparison on small operands.
    #[test]
    fn mul_ge_matches_native(a in 0u128..1u128 << 60, b in 0u128..101, c in 0u128..1u128 << 60, d in 0u128..101) {
        prop_assert_eq!(mul_ge(a, b, c, d), a * b >= c * d);
    }

    /// ListingHash bincode serialization roundtrip.
    #[test]
    fn listing_hash_bincode_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = ListingHash::new(bytes);
        let encoded = bincode::serialize(&hash).unwrap();
        let decoded: ListingHash = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, hash);
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }
}
