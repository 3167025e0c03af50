use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// Clock trait for abstracting time operations
pub trait Clock: Send + Sync {
    /// Current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Production implementation of Clock using system time
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test implementation of Clock with controllable time.
///
/// Clones share the same instant, so a test can keep one handle and advance
/// the time a service observes.
#[derive(Debug, Clone)]
pub struct FixedClock {
    timestamp: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: Arc::new(Mutex::new(timestamp)),
        }
    }

    /// Create a FixedClock from RFC3339 string
    pub fn from_rfc3339(timestamp_str: &str) -> Result<Self, chrono::ParseError> {
        let timestamp = DateTime::parse_from_rfc3339(timestamp_str)?.with_timezone(&Utc);
        Ok(Self::new(timestamp))
    }

    pub fn set_time(&self, timestamp: DateTime<Utc>) {
        let mut guard = self.timestamp.lock().unwrap_or_else(|e| e.into_inner());
        *guard = timestamp;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.timestamp.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }

    pub fn advance_days(&self, days: i64) {
        self.advance(Duration::days(days));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.timestamp.lock().unwrap_or_else(|e| e.into_inner())
    }
}
