use chrono::{DateTime, Duration, Utc};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::fmt;

/// Time left until a session window expires, floored at zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RemainingTime(i64); // seconds

impl RemainingTime {
    pub fn from_seconds(seconds: i64) -> Self {
        RemainingTime(seconds.max(0))
    }

    /// `max(0, end - now)`, rounded up to whole seconds
    ///
    /// Rounding up keeps a sub-second remainder non-zero, so only `now >= end`
    /// yields zero.
    pub fn until(end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let left = end.signed_duration_since(now);
        let seconds = left.num_seconds();
        if left > Duration::seconds(seconds) {
            Self::from_seconds(seconds + 1)
        } else {
            Self::from_seconds(seconds)
        }
    }

    pub fn as_duration(&self) -> Duration {
        Duration::seconds(self.0)
    }

    pub fn seconds(&self) -> i64 {
        self.0
    }

    /// Check if there's time remaining
    pub fn has_remaining(&self) -> bool {
        self.0 > 0
    }

    /// Format as a readable string (e.g., "2h 30m left")
    pub fn to_formatted_string(&self) -> String {
        let minutes = self.0 / 60;
        if minutes < 60 {
            format!("{}m left", minutes)
        } else {
            let hours = minutes / 60;
            let mins = minutes % 60;
            if mins > 0 {
                format!("{}h {}m left", hours, mins)
            } else {
                format!("{}h left", hours)
            }
        }
    }

    pub fn to_colored_string(&self) -> ColoredString {
        self.to_formatted_string().magenta()
    }
}

impl fmt::Display for RemainingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_formatted_string())
    }
}
