//! Appointment commands.

use abxcal_core::{Directory, EventDraft, EventPatch};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Subcommand;

use super::{format_event, open_calendar, parse_date, parse_datetime};

#[derive(Subcommand)]
pub enum EventAction {
    /// Add a confirmed event
    Add {
        /// Start, e.g. 2024-05-06T09:00
        #[arg(value_parser = parse_datetime)]
        start: NaiveDateTime,
        /// End; defaults to start plus the contact's treatment duration
        #[arg(long, value_parser = parse_datetime)]
        end: Option<NaiveDateTime>,
        /// Contact ID
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List events
    List {
        /// Only confirmed events starting at or after this time
        #[arg(long, value_parser = parse_datetime, requires = "to")]
        from: Option<NaiveDateTime>,
        /// Only confirmed events starting at or before this time
        #[arg(long, value_parser = parse_datetime, requires = "from")]
        to: Option<NaiveDateTime>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Events on one day, with the day total
    Day {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
        #[arg(long)]
        json: bool,
    },
    /// Confirmed events in the Monday-Sunday week containing a date
    Week {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
        #[arg(long)]
        json: bool,
    },
    /// Update a confirmed event
    Update {
        /// Event ID
        id: String,
        #[arg(long, value_parser = parse_datetime)]
        start: Option<NaiveDateTime>,
        #[arg(long, value_parser = parse_datetime)]
        end: Option<NaiveDateTime>,
        #[arg(long, conflicts_with = "no_contact")]
        contact: Option<String>,
        /// Detach the event from its contact
        #[arg(long)]
        no_contact: bool,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a confirmed event
    Delete {
        /// Event ID
        id: String,
    },
    /// Mark an event completed
    Complete {
        /// Event ID
        id: String,
        /// Clear the completed flag instead
        #[arg(long)]
        undo: bool,
    },
    /// Confirm the projected next appointment of a contact
    Confirm {
        /// Contact ID
        contact: String,
        /// Override the projected start
        #[arg(long, value_parser = parse_datetime)]
        start: Option<NaiveDateTime>,
        /// Override the projected end
        #[arg(long, value_parser = parse_datetime)]
        end: Option<NaiveDateTime>,
    },
}

pub fn run(action: EventAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut calendar = open_calendar()?;

    match action {
        EventAction::Add {
            start,
            end,
            contact,
            title,
            description,
        } => {
            let end = match end {
                Some(end) => end,
                None => {
                    let finder = calendar.projector().slot_finder();
                    let hours = contact
                        .as_deref()
                        .and_then(|id| calendar.directory().treatment_hours(id));
                    start
                        .checked_add_signed(finder.duration_for(hours))
                        .ok_or("end is out of range")?
                }
            };
            if end <= start {
                return Err("end must be after start".into());
            }

            let draft = EventDraft {
                start: Some(start),
                end: Some(end),
                contact_id: contact,
                confirmed: Some(true),
                title,
                description,
                is_completed: None,
            };
            let id = calendar.add(draft).ok_or("event rejected")?;
            println!("Event created: {id}");
            if let Some(event) = calendar.get(&id) {
                println!("{}", serde_json::to_string_pretty(event)?);
            }
        }
        EventAction::List { from, to, json } => {
            let events = match (from, to) {
                (Some(from), Some(to)) => calendar.events_in_range(from, to),
                _ => calendar.all_events(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else if events.is_empty() {
                println!("No events");
            } else {
                for event in events {
                    println!("{}", format_event(event));
                }
            }
        }
        EventAction::Day { date, json } => {
            let events = calendar.events_on(date);
            if json {
                let out = serde_json::json!({
                    "date": date,
                    "total": calendar.day_total(date),
                    "confirmed": calendar.confirmed_count_on(date),
                    "events": events,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!(
                    "{date}  {} confirmed, {}",
                    calendar.confirmed_count_on(date),
                    calendar.day_total(date)
                );
                for event in events {
                    println!("{}", format_event(event));
                }
            }
        }
        EventAction::Week { date, json } => {
            let monday = date
                .checked_sub_signed(Duration::days(date.weekday().num_days_from_monday().into()))
                .ok_or("week is out of range")?;
            let week_start = monday.and_time(NaiveTime::MIN);
            let week_end = week_start
                .checked_add_signed(Duration::days(7) - Duration::seconds(1))
                .unwrap_or(NaiveDateTime::MAX);
            let events = calendar.events_in_range(week_start, week_end);
            let total = calendar.week_total(week_start, week_end);
            if json {
                let out = serde_json::json!({
                    "weekStart": monday,
                    "total": total,
                    "events": events,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("Week of {monday}  {total}");
                for event in events {
                    println!("{}", format_event(event));
                }
            }
        }
        EventAction::Update {
            id,
            start,
            end,
            contact,
            no_contact,
            title,
            description,
        } => {
            let patch = EventPatch {
                start,
                end,
                contact_id: if no_contact { Some(None) } else { contact.map(Some) },
                title,
                description,
                is_completed: None,
            };
            if patch.is_empty() {
                return Err("nothing to update".into());
            }
            if !calendar.update(&id, patch) {
                return Err(format!("event not updated: {id}").into());
            }
            println!("Event updated:");
            if let Some(event) = calendar.get(&id) {
                println!("{}", serde_json::to_string_pretty(event)?);
            }
        }
        EventAction::Delete { id } => {
            if !calendar.delete(&id) {
                return Err(format!("event not found: {id}").into());
            }
            println!("Event deleted: {id}");
        }
        EventAction::Complete { id, undo } => {
            let patch = EventPatch {
                is_completed: Some(!undo),
                ..EventPatch::default()
            };
            if !calendar.update(&id, patch) {
                return Err(format!("event not found: {id}").into());
            }
            if undo {
                println!("Event reopened: {id}");
            } else {
                println!("Event completed: {id}");
            }
        }
        EventAction::Confirm {
            contact,
            start,
            end,
        } => {
            let mut ghost = calendar
                .ghost_for_contact(&contact)
                .cloned()
                .ok_or_else(|| format!("no projected appointment for contact: {contact}"))?;
            if let Some(start) = start {
                let length = ghost.end - ghost.start;
                ghost.start = start;
                ghost.end = start.checked_add_signed(length).ok_or("end is out of range")?;
            }
            if let Some(end) = end {
                ghost.end = end;
            }

            let id = calendar.confirm(&ghost).ok_or("confirmation rejected")?;
            println!("Event confirmed: {id}");
            if let Some(next) = calendar.ghost_for_contact(&contact) {
                println!("Next: {}", format_event(next));
            }
        }
    }
    Ok(())
}
