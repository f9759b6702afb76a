use super::event::Event;
use crate::constants::SESSION_BLOCK_DURATION;
use chrono::{DateTime, Utc};

/// A fixed-length accounting window and the events that fell into it
#[derive(Debug, Clone)]
pub struct SessionWindow<'a> {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub last_event_time: DateTime<Utc>,
    pub events: Vec<&'a Event>,
}

impl<'a> SessionWindow<'a> {
    /// Open a window anchored at `start`, seeded with its first event
    pub fn open(start: DateTime<Utc>, first: &'a Event) -> Self {
        Self {
            start,
            end: start + SESSION_BLOCK_DURATION,
            last_event_time: first.timestamp,
            events: vec![first],
        }
    }

    pub fn push(&mut self, event: &'a Event) {
        self.last_event_time = event.timestamp;
        self.events.push(event);
    }

    /// Whether `now` lies within `[start, end]`
    #[inline(always)]
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }
}
