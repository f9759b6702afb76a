//! Session quota metering for Claude usage logs.
//!
//! Events are read from per-project JSONL shards, normalized, and folded into
//! 5-hour accounting windows; [`engine::compute`] reports on the window that
//! contains "now".

// Module declarations
pub mod constants;
pub mod engine;
pub mod error;
pub mod formatting;
pub mod normalizer;
pub mod pricing;
pub mod session_blocks;
pub mod trace;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use engine::{compute, compute_with_trace};
pub use error::{MeterError, Result};
pub use normalizer::{normalize, normalize_line};
pub use pricing::PRICING_V1;
pub use trace::{CollectingSink, LogSink, NullSink, TraceEvent, TraceSink};
pub use types::{
    BurnRate, Cost, Event, Metrics, ModelBreakdown, ModelTier, Plan, ProjectLabel, QuotaConfig,
    RemainingTime, TokenTotals, TokenUsage, UniqueHash,
};
