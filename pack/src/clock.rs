//! Injectable time source.
//!
//! Every timestamp in a pack comes from one `Clock::now()` call so that a
//! fixed clock yields byte-identical archives.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a chosen instant.
#[derive(Debug, Clone)]
pub struct MockClock {
    pub current_time: DateTime<Utc>,
}

impl MockClock {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self { current_time: time }
    }

    /// 2026-01-15T12:00:00Z.
    pub fn fixed() -> Self {
        Self {
            current_time: DateTime::from_timestamp(1_768_478_400, 0).unwrap_or_default(),
        }
    }

    pub fn advance(&mut self, duration: Duration) {
        self.current_time += duration;
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        self.current_time
    }
}

/// RFC 3339 with second precision and a `Z` suffix.
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}
