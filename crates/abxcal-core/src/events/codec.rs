//! Encoding/decoding between confirmed events and their persisted records.
//!
//! Records are camelCase JSON objects with instants written as ISO-8601
//! local wall-clock strings. Decoding is lenient: a record with a missing or
//! unreadable instant gets the current time instead of failing the load, and
//! a range whose end is not after its start is stretched to one hour.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{Event, DEFAULT_TITLE};

/// Format used when writing instants.
pub const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Persisted shape of one confirmed event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub start: Option<serde_json::Value>,
    #[serde(default)]
    pub end: Option<serde_json::Value>,
    #[serde(default)]
    pub confirmed: Option<bool>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

/// Write an instant in [`INSTANT_FORMAT`].
pub fn format_instant(instant: NaiveDateTime) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

/// Read an instant written by [`format_instant`], an RFC 3339 timestamp
/// (converted to local wall-clock), or a bare date (midnight).
pub fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, INSTANT_FORMAT) {
        return Some(naive);
    }
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&Local).naive_local());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Convert a confirmed event to its persisted record.
pub fn encode_event(event: &Event) -> StoredEvent {
    StoredEvent {
        id: Some(event.id.clone()),
        start: Some(serde_json::Value::String(format_instant(event.start))),
        end: Some(serde_json::Value::String(format_instant(event.end))),
        confirmed: Some(true),
        title: Some(event.title.clone()),
        description: Some(event.description.clone()),
        contact_id: event.contact_id.clone(),
        is_completed: Some(event.is_completed),
    }
}

/// Convert a persisted record back to a confirmed event.
///
/// Unreadable instants become `now`, a missing id gets a fresh one, and the
/// event is always marked confirmed. The decoded range is always non-empty.
pub fn decode_event(record: StoredEvent, now: NaiveDateTime) -> Event {
    let instant = |value: Option<&serde_json::Value>, field: &str| {
        match value.and_then(|v| v.as_str()).and_then(parse_instant) {
            Some(parsed) => parsed,
            None => {
                tracing::warn!(field, value = ?value, "unreadable instant in stored event, using now");
                now
            }
        }
    };

    let (start, end) = repair_range(
        instant(record.start.as_ref(), "start"),
        instant(record.end.as_ref(), "end"),
    );

    Event {
        id: record
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(Event::new_id),
        start,
        end,
        contact_id: record.contact_id.filter(|c| !c.is_empty()),
        confirmed: true,
        title: record
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        description: record.description.unwrap_or_default(),
        is_completed: record.is_completed.unwrap_or(false),
    }
}

/// Keep `[start, end)` non-empty so the event stays editable.
fn repair_range(start: NaiveDateTime, end: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    if start < end {
        return (start, end);
    }
    tracing::warn!(%start, %end, "stored event ends before it starts, using a one hour span");
    match start.checked_add_signed(Duration::hours(1)) {
        Some(end) => (start, end),
        None => (start.checked_sub_signed(Duration::hours(1)).unwrap_or(NaiveDateTime::MIN), start),
    }
}

/// Encode the confirmed collection as a JSON array.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn encode_events(events: &[Event]) -> serde_json::Result<String> {
    let records: Vec<StoredEvent> = events
        .iter()
        .filter(|e| e.confirmed)
        .map(encode_event)
        .collect();
    serde_json::to_string(&records)
}

/// Decode a persisted JSON array, sorted by start time.
///
/// A payload that is not a JSON array of records yields an empty list and a
/// warning. Duplicate ids are replaced so ids stay unique.
pub fn decode_events(raw: &str, now: NaiveDateTime) -> Vec<Event> {
    let records: Vec<StoredEvent> = match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse stored events, starting empty");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut events: Vec<Event> = records
        .into_iter()
        .map(|record| {
            let mut event = decode_event(record, now);
            if !seen.insert(event.id.clone()) {
                tracing::warn!(id = %event.id, "duplicate stored event id, assigning a new one");
                event.id = Event::new_id();
                seen.insert(event.id.clone());
            }
            event
        })
        .collect();

    events.sort_by_key(|e| e.start);
    events
}
