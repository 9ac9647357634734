//! Domain primitives: UserId, BookingId, TimeMs.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    /// Create a TimeMs from milliseconds.
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        TimeMs(Utc::now().timestamp_millis())
    }

    /// Get the underlying milliseconds value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// The instant `window` before this one (saturating).
    pub fn minus(&self, window: Duration) -> Self {
        TimeMs(self.0.saturating_sub(window.num_milliseconds()))
    }

    /// Elapsed time from `earlier` to this instant.
    pub fn since(&self, earlier: TimeMs) -> Duration {
        Duration::milliseconds(self.0 - earlier.0)
    }
}

/// Platform account identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Create a UserId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    /// Get the id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Split booking identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookingId(pub String);

impl BookingId {
    /// Create a BookingId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        BookingId(id.into())
    }

    /// Get the id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timems_ordering() {
        let t1 = TimeMs::new(1000);
        let t2 = TimeMs::new(2000);
        assert!(t1 < t2);
    }

    #[test]
    fn test_timems_minus_window() {
        let now = TimeMs::new(1_000_000);
        let earlier = now.minus(Duration::hours(2));
        assert_eq!(earlier.as_i64(), 1_000_000 - 2 * 60 * 60 * 1000);
    }

    #[test]
    fn test_timems_since() {
        let a = TimeMs::new(5_000);
        let b = TimeMs::new(2_000);
        assert_eq!(a.since(b), Duration::milliseconds(3_000));
    }

    #[test]
    fn test_user_id_display() {
        let uid = UserId::new("user_abc");
        assert_eq!(uid.to_string(), "user_abc");
    }

    #[test]
    fn test_booking_id_display() {
        let id = BookingId::new("bk_123");
        assert_eq!(id.to_string(), "bk_123");
    }
}
