//! Subcommand implementations.
//!
//! Every command opens the calendar from the data directory, runs one
//! operation and exits. Ghost events are rebuilt on each open, so their ids
//! only live for one invocation; commands address ghosts by contact.

pub mod antibiotic;
pub mod config;
pub mod contact;
pub mod event;
pub mod slot;

use std::error::Error;

use abxcal_core::events::codec::parse_instant;
use abxcal_core::{Config, ContactBook, Event, EventStore, GhostProjector, SqliteStore};
use chrono::{NaiveDate, NaiveDateTime};

pub type Calendar = EventStore<ContactBook, SqliteStore>;

/// Open the persisted calendar with ghosts projected.
pub fn open_calendar() -> Result<Calendar, Box<dyn Error>> {
    let config = Config::load_or_default();
    let storage = SqliteStore::open()?;
    tracing::debug!(path = ?storage.path(), "opened calendar database");
    let book = ContactBook::load(&storage);
    Ok(EventStore::load(
        book,
        storage,
        GhostProjector::with_config(&config.scheduling),
    ))
}

/// Persist the contact book and refresh ghosts after a directory edit.
pub fn save_contacts(calendar: &mut Calendar) -> Result<(), Box<dyn Error>> {
    let book = calendar.directory().clone();
    book.save(calendar.storage_mut())?;
    calendar.regenerate_ghosts();
    Ok(())
}

/// Parse `YYYY-MM-DDTHH:MM[:SS]`, `YYYY-MM-DD HH:MM` or an RFC 3339 timestamp.
pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }
    parse_instant(raw).ok_or_else(|| format!("invalid date/time: {raw}"))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| format!("invalid date: {raw}"))
}

/// One event per line: time range, state, title and id.
pub fn format_event(event: &Event) -> String {
    let state = if event.is_ghost() {
        "ghost"
    } else if event.is_completed {
        "done"
    } else {
        "confirmed"
    };
    format!(
        "{} - {}  [{state}] {}  ({})",
        event.start.format("%Y-%m-%d %H:%M"),
        event.end.format("%H:%M"),
        event.title,
        event.id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_datetime_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2024-05-06T09:30"), Ok(expected));
        assert_eq!(parse_datetime("2024-05-06 09:30"), Ok(expected));
        assert_eq!(parse_datetime("2024-05-06T09:30:00"), Ok(expected));
        assert!(parse_datetime("tomorrow").is_err());
    }

    #[test]
    fn parses_dates() {
        assert_eq!(
            parse_date("2024-05-06"),
            Ok(NaiveDate::from_ymd_opt(2024, 5, 6).unwrap())
        );
        assert!(parse_date("06/05/2024").is_err());
    }
}
