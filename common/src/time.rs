// Time types used across the project
//
// The functions in this module read the system clock. They are suitable for
// ticket issue times, wait-time deadlines and logging, where a few
// milliseconds of skew between nodes are tolerated by the protocol.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// Millis timestamps used to determine it using its type
pub type TimestampMillis = u64;

#[inline]
pub fn get_current_time() -> Duration {
    // A clock set before the epoch reads as the epoch itself
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

// Return timestamp in milliseconds
// We cast it to u64 as we have plenty of time before it overflows (year 584,942,417 AD)
pub fn get_current_time_in_millis() -> TimestampMillis {
    get_current_time().as_millis() as TimestampMillis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_moves_forward() {
        let before = get_current_time_in_millis();
        let after = get_current_time_in_millis();
        assert!(before > 0);
        assert!(after >= before);
    }
}
