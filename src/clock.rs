//! Injectable time source.
//!
//! Expiry checks and cache TTLs are the only time-sensitive parts of the
//! decision path. Both read time through [`Clock`] so tests can move time
//! without sleeping.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A source of wall-clock time, expressed as a duration since the Unix epoch.
pub trait Clock: Send + Sync {
    /// Current time since the Unix epoch.
    fn now(&self) -> Duration;

    /// Current time in whole seconds since the Unix epoch.
    fn unix_seconds(&self) -> u64 {
        self.now().as_secs()
    }
}

/// Real wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

/// Manually driven clock for tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: parking_lot::Mutex<Duration>,
}

impl ManualClock {
    /// Create a clock frozen at the given number of seconds since the epoch.
    #[must_use]
    pub fn at_unix_seconds(secs: u64) -> Self {
        Self {
            now: parking_lot::Mutex::new(Duration::from_secs(secs)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    /// Jump the clock to an absolute instant.
    pub fn set(&self, to: Duration) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}
