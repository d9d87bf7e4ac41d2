//! Injectable wall-clock time source.
//!
//! The cache and history layers stamp entries with Unix-epoch milliseconds.
//! Hiding `SystemTime` behind [`Clock`] lets tests simulate a 7-day TTL
//! expiry without sleeping.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time in Unix-epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// Production clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_support::ManualClock;

    #[test]
    fn system_clock_is_after_2020() {
        // 2020-01-01 in epoch millis.
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_millis(), 1_000);
        clock.advance(500);
        assert_eq!(clock.now_millis(), 1_500);
    }
}
