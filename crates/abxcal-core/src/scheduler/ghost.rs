//! Projection of the next appointment for each recurring contact.
//!
//! For every contact with confirmed events, the event that ends last anchors
//! the projection. The contact's recurrence rule gives the next day, the
//! antibiotic gives the duration, and the slot finder places the ghost on
//! that day around confirmed events and the ghosts already placed.
//!
//! Projection is a pure function of the confirmed events and the directory,
//! so running it twice in a row yields the same times and contacts.

use indexmap::IndexMap;

use super::recurrence::next_for_rule;
use super::slot::{BusyInterval, SlotFinder};
use crate::contacts::Directory;
use crate::events::{insert_sorted, Event};
use crate::storage::SchedulingConfig;

/// Derives ghost events from confirmed events.
#[derive(Debug, Clone)]
pub struct GhostProjector {
    slots: SlotFinder,
    ghost_title: String,
}

impl GhostProjector {
    /// Create a projector with default scheduling settings.
    pub fn new() -> Self {
        Self::with_config(&SchedulingConfig::default())
    }

    /// Create with custom config
    pub fn with_config(config: &SchedulingConfig) -> Self {
        Self {
            slots: SlotFinder::with_config(config),
            ghost_title: config.ghost_title.clone(),
        }
    }

    pub fn slot_finder(&self) -> &SlotFinder {
        &self.slots
    }

    /// Project at most one ghost per contact, ordered by start time.
    ///
    /// Events without a contact are ignored. Contacts missing from the
    /// directory or without a recurrence rule get no ghost, and neither do
    /// contacts whose next appointment falls outside the representable
    /// calendar.
    pub fn project_all<D: Directory + ?Sized>(&self, confirmed: &[Event], directory: &D) -> Vec<Event> {
        let mut latest: IndexMap<&str, &Event> = IndexMap::new();
        for event in confirmed {
            let Some(contact_id) = event.contact_id.as_deref() else {
                continue;
            };
            latest
                .entry(contact_id)
                .and_modify(|current| {
                    if event.end > current.end {
                        *current = event;
                    }
                })
                .or_insert(event);
        }

        let mut ghosts: Vec<Event> = Vec::with_capacity(latest.len());
        for (contact_id, anchor) in latest {
            let Some(contact) = directory.contact(contact_id) else {
                tracing::debug!(contact_id, "contact not found, no ghost projected");
                continue;
            };
            let Some(rule) = contact.recurrence() else {
                continue;
            };

            let Some(next_start) = next_for_rule(anchor.start, rule) else {
                tracing::warn!(contact_id, anchor = %anchor.start, "next appointment out of range, no ghost projected");
                continue;
            };
            let day = next_start.date();
            let duration = self.slots.duration_for(directory.treatment_hours(contact_id));

            let mut busy: Vec<BusyInterval> = confirmed
                .iter()
                .chain(ghosts.iter())
                .filter(|e| e.starts_on(day))
                .map(Event::busy_interval)
                .collect();
            busy.sort_by_key(|b| b.start);

            let Some(slot) = self.slots.find_slot_for(day, duration, &busy) else {
                tracing::warn!(contact_id, %day, "treatment does not fit the calendar, no ghost projected");
                continue;
            };
            tracing::debug!(
                contact_id,
                anchor = %anchor.start,
                start = %slot.start,
                end = %slot.end,
                "projected ghost event"
            );

            insert_sorted(
                &mut ghosts,
                Event {
                    id: Event::new_id(),
                    start: slot.start,
                    end: slot.end,
                    contact_id: Some(contact_id.to_string()),
                    confirmed: false,
                    title: self.ghost_title.clone(),
                    description: String::new(),
                    is_completed: false,
                },
            );
        }

        ghosts
    }
}

impl Default for GhostProjector {
    fn default() -> Self {
        Self::new()
    }
}
