//! Timestamps and the clock seam.
//!
//! Timestamps are Unix epoch seconds (UTC). Registry deadlines are stored as
//! timestamps and compared lazily against a [`Clock`] at call time; nothing is
//! ever scheduled.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// `self + secs`, or `None` on overflow.
    pub fn checked_add_secs(&self, secs: u64) -> Option<Self> {
        self.0.checked_add(secs).map(Self)
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// Whether `now` is at or past this timestamp.
    pub fn has_passed(&self, now: Timestamp) -> bool {
        now.0 >= self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Source of the current logical time.
///
/// Production code uses the system clock; tests inject a clock they can
/// advance by hand.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_add_overflows_to_none() {
        assert_eq!(Timestamp::new(10).checked_add_secs(5), Some(Timestamp::new(15)));
        assert_eq!(Timestamp::new(u64::MAX).checked_add_secs(1), None);
    }

    #[test]
    fn has_passed_is_inclusive() {
        let deadline = Timestamp::new(100);
        assert!(!deadline.has_passed(Timestamp::new(99)));
        assert!(deadline.has_passed(Timestamp::new(100)));
        assert!(deadline.has_passed(Timestamp::new(101)));
    }
}
