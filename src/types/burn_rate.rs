use super::cost::Cost;
use super::event::Event;
use chrono::{DateTime, Duration, Utc};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::fmt;

/// Per-minute consumption over the trailing sub-window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BurnRate {
    pub tokens_per_minute: f64,
    pub cost_per_minute: f64,
    pub messages_per_minute: f64,
}

impl BurnRate {
    /// Cost per hour at the current pace
    pub fn cost_per_hour(&self) -> Cost {
        Cost::new(self.cost_per_minute * 60.0)
    }

    /// Get a colored string representation for terminal output
    pub fn to_colored_string(&self) -> ColoredString {
        let rate_str = self.to_string();
        if self.tokens_per_minute < 300.0 {
            rate_str.green()
        } else if self.tokens_per_minute < 1_000.0 {
            rate_str.yellow()
        } else {
            rate_str.red()
        }
    }
}

impl fmt::Display for BurnRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1} tok/min, {}/hr",
            self.tokens_per_minute,
            self.cost_per_hour()
        )
    }
}

/// Average of `value` per minute over events in `[now - window, now]`
///
/// The divisor runs from the earliest event inside the sub-window to `now`,
/// not the full window length. No events, or no elapsed time, gives 0.
pub fn trailing_rate<F>(events: &[&Event], now: DateTime<Utc>, window: Duration, value: F) -> f64
where
    F: Fn(&Event) -> f64,
{
    let cutoff = now - window;
    let mut earliest: Option<DateTime<Utc>> = None;
    let mut total = 0.0;

    for event in events
        .iter()
        .filter(|e| e.timestamp >= cutoff && e.timestamp <= now)
    {
        earliest = Some(earliest.map_or(event.timestamp, |t| t.min(event.timestamp)));
        total += value(*event);
    }

    let Some(earliest) = earliest else {
        return 0.0;
    };
    let elapsed_minutes = now.signed_duration_since(earliest).num_milliseconds() as f64 / 60_000.0;
    if elapsed_minutes <= 0.0 {
        return 0.0;
    }
    total / elapsed_minutes
}
