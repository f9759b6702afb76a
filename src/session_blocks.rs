use crate::constants::{SESSION_BLOCK_DURATION, STALE_EVENT_HORIZON};
use crate::trace::{TraceEvent, TraceSink, WindowOpenReason};
use crate::types::{Event, SessionWindow};
use crate::utils::dedup::dedup_first;
use chrono::{DateTime, Timelike, Utc};

/// Floor timestamp to the hour (e.g., 14:37:22 → 14:00:00)
pub fn floor_to_hour(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(timestamp)
}

/// Dedup, sort and staleness-filter the raw event list
///
/// Events without billable usage are dropped first. Dedup keeps the first
/// occurrence in arrival order; the sort is stable so timestamp ties keep
/// that order too.
pub fn prepare_events<'a>(
    events: &'a [Event],
    now: DateTime<Utc>,
    sink: &dyn TraceSink,
) -> Vec<&'a Event> {
    let (mut kept, duplicates) = dedup_first(events.iter().filter(|e| e.is_billable()));
    if duplicates > 0 {
        sink.record(TraceEvent::DuplicatesDropped { count: duplicates });
    }

    kept.sort_by_key(|e| e.timestamp);

    let cutoff = now - STALE_EVENT_HORIZON;
    let before = kept.len();
    kept.retain(|e| e.timestamp >= cutoff);
    let stale = before - kept.len();
    if stale > 0 {
        sink.record(TraceEvent::StaleEventsDropped {
            count: stale,
            cutoff,
        });
    }

    kept
}

/// Partition chronologically sorted events into non-overlapping windows
///
/// A new window opens on the first event, on any event at or past the current
/// window's end, and on any event arriving a full window length after the
/// previous one.
pub fn identify_session_windows<'a>(
    sorted_events: &[&'a Event],
    sink: &dyn TraceSink,
) -> Vec<SessionWindow<'a>> {
    let mut windows = Vec::new();
    let mut current: Option<SessionWindow<'a>> = None;

    for &event in sorted_events {
        let reason = match &current {
            None => Some(WindowOpenReason::First),
            Some(window) if event.timestamp >= window.end => Some(WindowOpenReason::PastEnd),
            Some(window)
                if event.timestamp - window.last_event_time >= SESSION_BLOCK_DURATION =>
            {
                Some(WindowOpenReason::InactivityGap)
            }
            Some(_) => None,
        };

        match reason {
            Some(reason) => {
                let start = floor_to_hour(event.timestamp);
                sink.record(TraceEvent::WindowOpened { start, reason });
                if let Some(closed) = current.replace(SessionWindow::open(start, event)) {
                    windows.push(closed);
                }
            }
            None => {
                if let Some(window) = current.as_mut() {
                    window.push(event);
                }
            }
        }
    }

    // Close the final open window
    if let Some(window) = current {
        windows.push(window);
    }

    windows
}

/// Find the window containing `now`; the last candidate wins if several do
pub fn find_active_window<'w, 'a>(
    windows: &'w [SessionWindow<'a>],
    now: DateTime<Utc>,
    sink: &dyn TraceSink,
) -> Option<&'w SessionWindow<'a>> {
    let candidates = windows.iter().filter(|w| w.contains(now)).count();
    let active = windows.iter().rev().find(|w| w.contains(now));

    match active {
        Some(window) => sink.record(TraceEvent::ActiveWindowSelected {
            start: window.start,
            end: window.end,
            events: window.events.len(),
            candidates,
        }),
        None => sink.record(TraceEvent::NoActiveSession {
            windows: windows.len(),
        }),
    }

    active
}
