//! # abxcal Core Library
//!
//! Scheduling logic for a calendar of recurring antibiotic treatments.
//! Every interface, including the `abxcal` CLI, is a thin layer over this
//! crate.
//!
//! ## Architecture
//!
//! - **Events**: confirmed appointments are persisted; ghost appointments
//!   are projected from them and live in memory only
//! - **Scheduler**: recurrence arithmetic, hourly slot finding and ghost
//!   projection, all pure functions
//! - **Contacts**: contact and antibiotic records that drive recurrence and
//!   treatment length
//! - **Storage**: key/value persistence (SQLite or in-memory) and TOML
//!   configuration
//!
//! ## Key Components
//!
//! - [`EventStore`]: confirmed and ghost events with their mutations
//! - [`GhostProjector`]: derives the next appointment per contact
//! - [`ContactBook`]: contact and antibiotic directory
//! - [`KeyValueStore`]: persistence seam
//! - [`Config`]: application configuration management

pub mod contacts;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod storage;

pub use contacts::{
    Antibiotic, Contact, ContactBook, ContactDirectory, ContactPatch, AntibioticDirectory,
    Directory, InjectionType, LocationType, NewContact, RecurrenceRule, RecurrenceUnit,
};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::{DurationStyle, Event, EventDraft, EventPatch, EventStore};
pub use scheduler::{BusyInterval, GhostProjector, Slot, SlotFinder};
pub use storage::{Config, KeyValueStore, MemoryStore, SchedulingConfig, SqliteStore};
