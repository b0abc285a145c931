//! Confirmed and ghost event collections.
//!
//! Every change to the confirmed set runs in two phases: the change is
//! applied, then the ghost set is replaced by a fresh projection and the
//! confirmed set is written to storage. Projection is a pure function that
//! never touches the store, and mutations need `&mut self`, so a projection
//! pass can neither trigger another one nor run concurrently with a write.
//!
//! No operation returns an error. Rejected input and storage failures are
//! logged and leave the store unchanged.

use chrono::{Local, NaiveDate, NaiveDateTime};

use super::codec::{decode_events, encode_events};
use super::totals::{total_duration, DurationStyle};
use super::{insert_sorted, Event, EventDraft, EventPatch};
use crate::contacts::Directory;
use crate::scheduler::{BusyInterval, GhostProjector, Slot};
use crate::storage::{KeyValueStore, MemoryStore, EVENTS_KEY};

/// Owner of all events for one calendar.
pub struct EventStore<D, S = MemoryStore> {
    confirmed: Vec<Event>,
    ghosts: Vec<Event>,
    projector: GhostProjector,
    directory: D,
    storage: S,
}

impl<D: Directory, S: KeyValueStore> EventStore<D, S> {
    /// Empty store with default scheduling settings.
    pub fn new(directory: D, storage: S) -> Self {
        Self::with_projector(directory, storage, GhostProjector::new())
    }

    /// Empty store with an explicit projector.
    pub fn with_projector(directory: D, storage: S, projector: GhostProjector) -> Self {
        Self {
            confirmed: Vec::new(),
            ghosts: Vec::new(),
            projector,
            directory,
            storage,
        }
    }

    /// Restore confirmed events from `storage` and project ghosts.
    ///
    /// A missing payload starts empty. An unreadable one is logged and also
    /// starts empty.
    pub fn load(directory: D, storage: S, projector: GhostProjector) -> Self {
        let mut store = Self::with_projector(directory, storage, projector);
        match store.storage.load_raw(EVENTS_KEY) {
            Ok(Some(raw)) => {
                store.confirmed = decode_events(&raw, Local::now().naive_local());
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored events, starting empty");
            }
        }
        tracing::info!(count = store.confirmed.len(), "loaded confirmed events");
        store.regenerate_ghosts();
        store
    }

    /// Confirmed events ordered by start time.
    pub fn confirmed(&self) -> &[Event] {
        &self.confirmed
    }

    /// Ghost events ordered by start time.
    pub fn ghosts(&self) -> &[Event] {
        &self.ghosts
    }

    /// Confirmed events followed by ghosts.
    pub fn all_events(&self) -> Vec<&Event> {
        self.confirmed.iter().chain(self.ghosts.iter()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.confirmed
            .iter()
            .chain(self.ghosts.iter())
            .find(|e| e.id == id)
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Mutable access to contacts and antibiotics.
    ///
    /// Ghosts are not refreshed automatically; call
    /// [`regenerate_ghosts`](Self::regenerate_ghosts) after editing.
    pub fn directory_mut(&mut self) -> &mut D {
        &mut self.directory
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn projector(&self) -> &GhostProjector {
        &self.projector
    }

    /// Add an event and return its new id.
    ///
    /// Confirmed drafts go to the confirmed set and trigger projection.
    /// Unconfirmed drafts go to the ghost set as-is and must name a contact.
    /// Invalid drafts are logged and dropped.
    pub fn add(&mut self, draft: EventDraft) -> Option<String> {
        let event = match draft.into_event() {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "rejected new event");
                return None;
            }
        };
        let id = event.id.clone();

        if event.confirmed {
            insert_sorted(&mut self.confirmed, event);
            tracing::info!(id = %id, "confirmed event added");
            self.commit();
        } else {
            insert_sorted(&mut self.ghosts, event);
        }
        Some(id)
    }

    /// Merge `patch` into the event with `id`.
    ///
    /// Returns `false` when the id is unknown or the result would be
    /// invalid; the event is then left untouched.
    pub fn update(&mut self, id: &str, patch: EventPatch) -> bool {
        if let Some(index) = self.confirmed.iter().position(|e| e.id == id) {
            match patch.apply_to(&self.confirmed[index]) {
                Ok(updated) => {
                    self.confirmed[index] = updated;
                    self.confirmed.sort_by_key(|e| e.start);
                    tracing::info!(id, "confirmed event updated");
                    self.commit();
                    true
                }
                Err(e) => {
                    tracing::warn!(id, error = %e, "rejected event update");
                    false
                }
            }
        } else if let Some(index) = self.ghosts.iter().position(|e| e.id == id) {
            match patch.apply_to(&self.ghosts[index]) {
                Ok(updated) => {
                    self.ghosts[index] = updated;
                    self.ghosts.sort_by_key(|e| e.start);
                    true
                }
                Err(e) => {
                    tracing::warn!(id, error = %e, "rejected ghost update");
                    false
                }
            }
        } else {
            tracing::debug!(id, "update for unknown event ignored");
            false
        }
    }

    /// Remove a confirmed event. Ghost ids are ignored.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.confirmed.len();
        self.confirmed.retain(|e| e.id != id);
        if self.confirmed.len() == before {
            tracing::debug!(id, "delete for unknown event ignored");
            return false;
        }
        tracing::info!(id, "confirmed event deleted");
        self.commit();
        true
    }

    /// Promote a ghost to a confirmed event with a new id.
    ///
    /// The ghost with the same id is dropped. Times, contact and text are
    /// taken from `ghost`, so callers may adjust them before confirming.
    /// Returns `None` if the resulting event would be invalid.
    pub fn confirm(&mut self, ghost: &Event) -> Option<String> {
        let event = Event {
            id: Event::new_id(),
            confirmed: true,
            ..ghost.clone()
        };
        if let Err(e) = event.validate() {
            tracing::warn!(ghost_id = %ghost.id, error = %e, "rejected confirmation");
            return None;
        }

        self.ghosts.retain(|e| e.id != ghost.id);
        let id = event.id.clone();
        insert_sorted(&mut self.confirmed, event);
        tracing::info!(ghost_id = %ghost.id, id = %id, "ghost event confirmed");
        self.commit();
        Some(id)
    }

    /// Ghost currently projected for a contact.
    pub fn ghost_for_contact(&self, contact_id: &str) -> Option<&Event> {
        self.ghosts
            .iter()
            .find(|e| e.contact_id.as_deref() == Some(contact_id))
    }

    /// Confirmed and ghost events starting on `day`, ordered by start time.
    pub fn events_on(&self, day: NaiveDate) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .confirmed
            .iter()
            .chain(self.ghosts.iter())
            .filter(|e| e.starts_on(day))
            .collect();
        events.sort_by_key(|e| e.start);
        events
    }

    /// Confirmed events whose start lies in `[start, end]`.
    pub fn events_in_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<&Event> {
        self.confirmed
            .iter()
            .filter(|e| e.start >= start && e.start <= end)
            .collect()
    }

    pub fn confirmed_count_on(&self, day: NaiveDate) -> usize {
        self.confirmed.iter().filter(|e| e.starts_on(day)).count()
    }

    /// Compact total of confirmed events on `day`, e.g. `"2.50h"`.
    pub fn day_total(&self, day: NaiveDate) -> String {
        total_duration(
            self.confirmed.iter().filter(|e| e.starts_on(day)),
            DurationStyle::Compact,
        )
    }

    /// Wide total of confirmed events starting in `[week_start, week_end]`.
    pub fn week_total(&self, week_start: NaiveDateTime, week_end: NaiveDateTime) -> String {
        total_duration(
            self.events_in_range(week_start, week_end),
            DurationStyle::Wide,
        )
    }

    /// Suggested time for a new appointment on `day`.
    ///
    /// Avoids every confirmed and ghost event on that day. The duration comes
    /// from the contact's antibiotic when one is known. Returns `None` when
    /// the treatment cannot end within the representable calendar.
    pub fn suggest_slot(&self, day: NaiveDate, contact_id: Option<&str>) -> Option<Slot> {
        let busy: Vec<BusyInterval> = self
            .events_on(day)
            .into_iter()
            .map(Event::busy_interval)
            .collect();
        let finder = self.projector.slot_finder();
        let hours = contact_id.and_then(|id| self.directory.treatment_hours(id));
        finder.find_slot_for(day, finder.duration_for(hours), &busy)
    }

    /// Replace the ghost set with a fresh projection.
    pub fn regenerate_ghosts(&mut self) {
        self.ghosts = self.projector.project_all(&self.confirmed, &self.directory);
        tracing::debug!(count = self.ghosts.len(), "ghost events regenerated");
    }

    fn commit(&mut self) {
        self.regenerate_ghosts();
        self.persist();
    }

    fn persist(&mut self) {
        let raw = match encode_events(&self.confirmed) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode confirmed events");
                return;
            }
        };
        if let Err(e) = self.storage.save_raw(EVENTS_KEY, &raw) {
            tracing::error!(error = %e, "failed to save confirmed events");
        }
    }
}
