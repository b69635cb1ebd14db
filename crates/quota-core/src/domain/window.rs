use chrono::{DateTime, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Length of every quota window, in seconds.
pub const WINDOW_LENGTH_SECS: i64 = 60;

/// Truncate `now` to the start of the minute that contains it.
pub fn current_window(now: DateTime<Utc>) -> DateTime<Utc> {
    now - TimeDelta::seconds(i64::from(now.second()))
        - TimeDelta::nanoseconds(i64::from(now.nanosecond()))
}

/// First instant after the window that starts at `window_start`.
pub fn window_end(window_start: DateTime<Utc>) -> DateTime<Utc> {
    window_start + TimeDelta::seconds(WINDOW_LENGTH_SECS)
}

/// Minute-resolution display label, e.g. `2024-05-01T12:34`. Never used for comparison.
pub fn label(window_start: DateTime<Utc>) -> String {
    window_start.format("%Y-%m-%dT%H:%M").to_string()
}

/// Identifies one quota bucket: a caller identity within one window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowKey {
    identity: String,
    window_start: DateTime<Utc>,
}

impl WindowKey {
    /// Build a key from an already-aligned window start.
    pub fn new(identity: impl Into<String>, window_start: DateTime<Utc>) -> Self {
        Self {
            identity: identity.into(),
            window_start,
        }
    }

    /// Key for the window containing `now`.
    pub fn at(identity: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::new(identity, current_window(now))
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn window_start(&self) -> DateTime<Utc> {
        self.window_start
    }

    pub fn window_end(&self) -> DateTime<Utc> {
        window_end(self.window_start)
    }

    pub fn label(&self) -> String {
        label(self.window_start)
    }
}
