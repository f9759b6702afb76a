use chrono::Duration;

/// The duration of a session window in hours
/// Also the inactivity gap that forces a new window to open
pub const SESSION_BLOCK_DURATION: Duration = Duration::hours(5);

/// Events older than this (relative to now) cannot belong to a live window
pub const STALE_EVENT_HORIZON: Duration = Duration::hours(192);

/// Trailing sub-window used for burn rate estimation
pub const BURN_RATE_WINDOW: Duration = Duration::minutes(10);

/// Correlation id used when a record carries no request id
pub const UNKNOWN_REQUEST_ID: &str = "unknown";

/// Per-event cost is rounded to this many decimal places
pub const COST_DECIMAL_PLACES: i32 = 6;
