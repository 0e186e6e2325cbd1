//! Wall-clock time and duration formatting.

use std::time::{SystemTime, UNIX_EPOCH};
use tcr_types::{Clock, Timestamp};

/// The operating system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Timestamp::new(secs)
    }
}

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_stage_lengths() {
        assert_eq!(format_duration(10), "10s");
        assert_eq!(format_duration(90), "1m 30s");
        assert_eq!(format_duration(7_200), "2h 0m");
        assert_eq!(format_duration(3 * 86_400 + 3_600), "3d 1h");
    }

    #[test]
    fn system_clock_is_past_epoch() {
        assert!(SystemClock.now() > Timestamp::EPOCH);
    }
}
