//! Appointment model.
//!
//! An [`Event`] is either confirmed (committed by the user and persisted) or
//! a ghost (projected by the [`GhostProjector`](crate::scheduler::GhostProjector)
//! and kept in memory only). New events are described by an [`EventDraft`];
//! partial edits by an [`EventPatch`].

pub mod codec;
mod store;
mod totals;

pub use store::EventStore;
pub use totals::{format_minutes, total_duration, total_minutes, DurationStyle};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::scheduler::BusyInterval;

pub const DEFAULT_TITLE: &str = "New Event";

/// A scheduled appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    pub confirmed: bool,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
}

impl Event {
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Interval this event occupies for slot finding.
    pub fn busy_interval(&self) -> BusyInterval {
        BusyInterval::new(self.start, self.end)
    }

    /// Whether the event starts on `day`.
    pub fn starts_on(&self, day: NaiveDate) -> bool {
        self.start.date() == day
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn is_ghost(&self) -> bool {
        !self.confirmed
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.start >= self.end {
            return Err(ValidationError::InvalidTimeRange {
                start: self.start,
                end: self.end,
            });
        }
        if !self.confirmed && self.contact_id.is_none() {
            return Err(ValidationError::GhostWithoutContact);
        }
        Ok(())
    }
}

/// Input for [`EventStore::add`]. Absent fields take the documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    #[serde(default)]
    pub contact_id: Option<String>,
    /// Defaults to `false`.
    #[serde(default)]
    pub confirmed: Option<bool>,
    /// Defaults to "New Event".
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

impl EventDraft {
    /// Draft spanning `[start, end)`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn confirmed(mut self) -> Self {
        self.confirmed = Some(true);
        self
    }

    pub fn with_contact(mut self, contact_id: impl Into<String>) -> Self {
        self.contact_id = Some(contact_id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Build an event with a fresh id. Empty titles count as absent.
    pub(crate) fn into_event(self) -> Result<Event, ValidationError> {
        let start = self.start.ok_or_else(|| ValidationError::InvalidValue {
            field: "start".into(),
            message: "is required".into(),
        })?;
        let end = self.end.ok_or_else(|| ValidationError::InvalidValue {
            field: "end".into(),
            message: "is required".into(),
        })?;

        let event = Event {
            id: Event::new_id(),
            start,
            end,
            contact_id: self.contact_id.filter(|c| !c.is_empty()),
            confirmed: self.confirmed.unwrap_or(false),
            title: self
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            description: self.description.unwrap_or_default(),
            is_completed: self.is_completed.unwrap_or(false),
        };
        event.validate()?;
        Ok(event)
    }
}

/// Field-wise update for [`EventStore::update`]. `None` keeps the old value.
///
/// `contact_id` is doubly optional: `Some(None)` detaches the contact.
/// Confirmation is not patchable; ghosts are promoted with
/// [`EventStore::confirm`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub contact_id: Option<Option<String>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge this patch over `event`, returning the updated copy.
    pub(crate) fn apply_to(&self, event: &Event) -> Result<Event, ValidationError> {
        let updated = Event {
            id: event.id.clone(),
            start: self.start.unwrap_or(event.start),
            end: self.end.unwrap_or(event.end),
            contact_id: match &self.contact_id {
                Some(contact) => contact.clone(),
                None => event.contact_id.clone(),
            },
            confirmed: event.confirmed,
            title: self.title.clone().unwrap_or_else(|| event.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| event.description.clone()),
            is_completed: self.is_completed.unwrap_or(event.is_completed),
        };
        updated.validate()?;
        Ok(updated)
    }
}

/// Insert `event` keeping `events` ordered by start time. Events with equal
/// starts keep insertion order.
pub(crate) fn insert_sorted(events: &mut Vec<Event>, event: Event) {
    let index = events.partition_point(|e| e.start <= event.start);
    events.insert(index, event);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn draft_fills_defaults() {
        let event = EventDraft::new(at(6, 9), at(6, 10))
            .with_contact("c1")
            .into_event()
            .unwrap();
        assert!(!event.confirmed);
        assert_eq!(event.title, "New Event");
        assert_eq!(event.description, "");
        assert!(!event.is_completed);
        assert!(!event.id.is_empty());
    }

    #[test]
    fn draft_rejects_inverted_range() {
        let err = EventDraft::new(at(6, 10), at(6, 9))
            .confirmed()
            .into_event()
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTimeRange { .. }));
    }

    #[test]
    fn unconfirmed_draft_requires_contact() {
        let err = EventDraft::new(at(6, 9), at(6, 10)).into_event().unwrap_err();
        assert_eq!(err, ValidationError::GhostWithoutContact);
    }

    #[test]
    fn patch_keeps_absent_fields() {
        let event = EventDraft::new(at(6, 9), at(6, 10))
            .confirmed()
            .with_title("Infusion")
            .with_contact("c1")
            .into_event()
            .unwrap();
        let patch = EventPatch {
            description: Some("bring pump".into()),
            ..EventPatch::default()
        };
        let updated = patch.apply_to(&event).unwrap();
        assert_eq!(updated.id, event.id);
        assert_eq!(updated.title, "Infusion");
        assert_eq!(updated.description, "bring pump");
        assert_eq!(updated.contact_id.as_deref(), Some("c1"));
    }

    #[test]
    fn patch_can_detach_contact() {
        let event = EventDraft::new(at(6, 9), at(6, 10))
            .confirmed()
            .with_contact("c1")
            .into_event()
            .unwrap();
        let patch = EventPatch {
            contact_id: Some(None),
            ..EventPatch::default()
        };
        assert_eq!(patch.apply_to(&event).unwrap().contact_id, None);
    }

    #[test]
    fn insert_sorted_keeps_order_and_ties_stable() {
        let mut events = Vec::new();
        for (h, title) in [(10, "a"), (8, "b"), (10, "c"), (9, "d")] {
            let e = EventDraft::new(at(6, h), at(6, h + 1))
                .confirmed()
                .with_title(title)
                .into_event()
                .unwrap();
            insert_sorted(&mut events, e);
        }
        let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "d", "a", "c"]);
    }
}
