//! Next-appointment projection.
//!
//! - [`recurrence`]: the weekday-adjusted next date for a contact's rule
//! - [`SlotFinder`]: the first free hourly slot on a day
//! - [`GhostProjector`]: one projected (ghost) event per recurring contact

mod ghost;
pub mod recurrence;
mod slot;

pub use ghost::GhostProjector;
pub use recurrence::{next_for_rule, next_occurrence};
pub use slot::{hours_to_duration, BusyInterval, Slot, SlotFinder};
