//! Turns one raw log record into a validated [`Event`], or discards it.

use crate::constants::UNKNOWN_REQUEST_ID;
use crate::error::{MeterError, Result};
use crate::types::{Event, MessageId, ProjectLabel, RawRecord, RequestId, Role, TokenUsage};
use chrono::{DateTime, Utc};

/// Normalize a decoded record
///
/// Returns `None` for records without a usage object, with zero input+output
/// tokens, or without a parseable timestamp.
pub fn normalize(record: &RawRecord, project: Option<&ProjectLabel>) -> Option<Event> {
    let raw_usage = record.usage()?;
    let usage = TokenUsage {
        input_tokens: raw_usage.input_tokens.unwrap_or(0),
        output_tokens: raw_usage.output_tokens.unwrap_or(0),
        cache_creation_tokens: raw_usage.cache_creation_input_tokens.unwrap_or(0),
        cache_read_tokens: raw_usage.cache_read_input_tokens.unwrap_or(0),
    };
    if !usage.is_billable() {
        return None;
    }

    let timestamp = parse_timestamp(record.timestamp.as_deref()?)?;

    let correlation_id = record.request_id().unwrap_or(UNKNOWN_REQUEST_ID);

    Some(Event {
        id: record.message_id().map(MessageId::from),
        correlation_id: RequestId::from(correlation_id),
        timestamp,
        role: Role::parse(record.role()),
        model: record.model().map(str::to_string),
        project: project.cloned(),
        usage: Some(usage),
    })
}

/// Decode one JSONL line and normalize it
///
/// Malformed JSON is an error so the caller can log and skip the line;
/// a well-formed but unusable record is `Ok(None)`.
pub fn normalize_line(line: &str, project: Option<&ProjectLabel>) -> Result<Option<Event>> {
    let record: RawRecord = serde_json::from_str(line).map_err(|source| MeterError::JsonParse {
        context: truncate_for_log(line),
        source,
    })?;
    Ok(normalize(&record, project))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn truncate_for_log(line: &str) -> String {
    const MAX_CONTEXT: usize = 80;
    match line.char_indices().nth(MAX_CONTEXT) {
        Some((idx, _)) => format!("{}...", &line[..idx]),
        None => line.to_string(),
    }
}
