//! Contact commands. Every edit is saved and re-projects ghosts.

use abxcal_core::{ContactDirectory, ContactPatch, InjectionType, LocationType, NewContact, RecurrenceUnit};
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::{format_event, open_calendar, parse_date, save_contacts, Calendar};

/// Largest accepted recurrence interval, ten years in days.
const MAX_RECURRENCE: i64 = 3650;

/// Fields shared by `add` and `update`.
#[derive(Args)]
pub struct ContactFields {
    #[arg(long)]
    full_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long, value_parser = parse_date)]
    birth_date: Option<NaiveDate>,
    /// home or clinic
    #[arg(long)]
    location: Option<LocationType>,
    #[arg(long)]
    address: Option<String>,
    /// intravenous or subcutaneous
    #[arg(long)]
    injection: Option<InjectionType>,
    /// Antibiotic name
    #[arg(long)]
    antibiotic: Option<String>,
    #[arg(long)]
    color: Option<String>,
    /// Recurrence interval, e.g. 2 for every two days/weeks (at most 3650)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_RECURRENCE))]
    every: Option<u32>,
    /// Recurrence unit: day or week
    #[arg(long)]
    unit: Option<RecurrenceUnit>,
}

#[derive(Subcommand)]
pub enum ContactAction {
    /// Create a contact
    Add {
        /// Display name
        name: String,
        #[command(flatten)]
        fields: ContactFields,
    },
    /// List contacts
    List {
        /// Include archived contacts
        #[arg(long)]
        all: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show a contact and its next projected appointment
    Show {
        /// Contact ID
        id: String,
    },
    /// Update a contact
    Update {
        /// Contact ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: ContactFields,
        /// Stop projecting appointments for this contact
        #[arg(long, conflicts_with_all = ["every", "unit"])]
        no_recurrence: bool,
    },
    /// Delete a contact
    Delete {
        /// Contact ID
        id: String,
    },
    /// Archive a contact
    Archive {
        /// Contact ID
        id: String,
        /// Unarchive instead
        #[arg(long)]
        undo: bool,
    },
}

pub fn run(action: ContactAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut calendar = open_calendar()?;

    match action {
        ContactAction::Add { name, fields } => {
            let new = NewContact {
                name,
                full_name: fields.full_name,
                email: fields.email,
                phone_number: fields.phone,
                birth_date: fields.birth_date,
                location_type: fields.location.unwrap_or_default(),
                address: fields.address,
                injection_type: fields.injection.unwrap_or_default(),
                antibiotic: fields.antibiotic.unwrap_or_default(),
                color: fields.color.unwrap_or_default(),
                antibiotic_recurrence_value: fields.every,
                antibiotic_recurrence_unit: fields.unit,
            };
            let id = calendar.directory_mut().add_contact(new);
            save_contacts(&mut calendar)?;
            println!("Contact created: {id}");
            print_contact(&calendar, &id)?;
        }
        ContactAction::List { all, json } => {
            let contacts = calendar.directory().contacts(all);
            if json {
                println!("{}", serde_json::to_string_pretty(&contacts)?);
            } else if contacts.is_empty() {
                println!("No contacts");
            } else {
                for contact in contacts {
                    let recurrence = contact
                        .recurrence()
                        .map(|r| format!("every {} {:?}", r.value, r.unit).to_lowercase())
                        .unwrap_or_else(|| "no recurrence".to_string());
                    let archived = if contact.is_archived { " [archived]" } else { "" };
                    println!("{}  {}  {recurrence}{archived}", contact.id, contact.name);
                }
            }
        }
        ContactAction::Show { id } => {
            print_contact(&calendar, &id)?;
        }
        ContactAction::Update {
            id,
            name,
            fields,
            no_recurrence,
        } => {
            let patch = ContactPatch {
                name,
                full_name: fields.full_name,
                email: fields.email,
                phone_number: fields.phone,
                birth_date: fields.birth_date,
                location_type: fields.location,
                address: fields.address,
                injection_type: fields.injection,
                antibiotic: fields.antibiotic,
                color: fields.color,
                is_archived: None,
                antibiotic_recurrence_value: fields.every,
                antibiotic_recurrence_unit: fields.unit,
            };
            let book = calendar.directory_mut();
            if !book.update_contact(&id, patch) {
                return Err(format!("contact not found: {id}").into());
            }
            if no_recurrence {
                book.clear_recurrence(&id);
            }
            save_contacts(&mut calendar)?;
            println!("Contact updated:");
            print_contact(&calendar, &id)?;
        }
        ContactAction::Delete { id } => {
            if calendar.directory_mut().delete_contact(&id).is_none() {
                return Err(format!("contact not found: {id}").into());
            }
            save_contacts(&mut calendar)?;
            println!("Contact deleted: {id}");
        }
        ContactAction::Archive { id, undo } => {
            let patch = ContactPatch {
                is_archived: Some(!undo),
                ..ContactPatch::default()
            };
            if !calendar.directory_mut().update_contact(&id, patch) {
                return Err(format!("contact not found: {id}").into());
            }
            save_contacts(&mut calendar)?;
            if undo {
                println!("Contact unarchived: {id}");
            } else {
                println!("Contact archived: {id}");
            }
        }
    }
    Ok(())
}

fn print_contact(calendar: &Calendar, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let contact = calendar
        .directory()
        .contact(id)
        .ok_or_else(|| format!("contact not found: {id}"))?;
    println!("{}", serde_json::to_string_pretty(contact)?);
    if let Some(next) = calendar.ghost_for_contact(id) {
        println!("Next: {}", format_event(next));
    }
    Ok(())
}
