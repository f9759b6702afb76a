//! Structured trace of what the metrics engine did on one call.
//!
//! The engine never logs on its own; it reports to a [`TraceSink`] handed in
//! by the caller.

use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::fmt;

/// Why a new window was opened during partitioning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOpenReason {
    /// First retained event
    First,
    /// Event at or past the current window's end
    PastEnd,
    /// Gap since the previous event reached a full window length
    InactivityGap,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    DuplicatesDropped {
        count: usize,
    },
    StaleEventsDropped {
        count: usize,
        cutoff: DateTime<Utc>,
    },
    WindowOpened {
        start: DateTime<Utc>,
        reason: WindowOpenReason,
    },
    ActiveWindowSelected {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        events: usize,
        candidates: usize,
    },
    NoActiveSession {
        windows: usize,
    },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::DuplicatesDropped { count } => {
                write!(f, "dropped {count} duplicate events")
            }
            TraceEvent::StaleEventsDropped { count, cutoff } => {
                write!(f, "dropped {count} events older than {}", cutoff.to_rfc3339())
            }
            TraceEvent::WindowOpened { start, reason } => {
                write!(f, "opened window at {} ({reason:?})", start.to_rfc3339())
            }
            TraceEvent::ActiveWindowSelected {
                start,
                end,
                events,
                candidates,
            } => write!(
                f,
                "active window {}..{} with {events} events ({candidates} candidates)",
                start.to_rfc3339(),
                end.to_rfc3339()
            ),
            TraceEvent::NoActiveSession { windows } => {
                write!(f, "no active session among {windows} windows")
            }
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TraceSink {
    fn record(&self, event: TraceEvent);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn record(&self, _event: TraceEvent) {}
}

/// Forwards trace events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn record(&self, event: TraceEvent) {
        match event {
            TraceEvent::WindowOpened { .. } => log::trace!("{event}"),
            _ => log::debug!("{event}"),
        }
    }
}

/// Buffers trace events in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: RefCell<Vec<TraceEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events.into_inner()
    }
}

impl TraceSink for CollectingSink {
    fn record(&self, event: TraceEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        sink.record(TraceEvent::DuplicatesDropped { count: 2 });
        sink.record(TraceEvent::NoActiveSession { windows: 0 });

        assert_eq!(
            sink.into_events(),
            vec![
                TraceEvent::DuplicatesDropped { count: 2 },
                TraceEvent::NoActiveSession { windows: 0 },
            ]
        );
    }

    #[test]
    fn test_trace_display() {
        let event = TraceEvent::DuplicatesDropped { count: 3 };
        assert_eq!(event.to_string(), "dropped 3 duplicate events");
        let event = TraceEvent::NoActiveSession { windows: 4 };
        assert_eq!(event.to_string(), "no active session among 4 windows");
    }
}
