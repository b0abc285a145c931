use chrono::NaiveDate;
use clap::Subcommand;

use super::{open_calendar, parse_date};

#[derive(Subcommand)]
pub enum SlotAction {
    /// Suggest the first free slot on a day
    Suggest {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
        /// Size the slot for this contact's antibiotic
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: SlotAction) -> Result<(), Box<dyn std::error::Error>> {
    let calendar = open_calendar()?;

    match action {
        SlotAction::Suggest {
            date,
            contact,
            json,
        } => {
            let slot = calendar
                .suggest_slot(date, contact.as_deref())
                .ok_or("no slot available on that day")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&slot)?);
            } else {
                println!(
                    "{} - {} ({} min)",
                    slot.start.format("%Y-%m-%d %H:%M"),
                    slot.end.format("%H:%M"),
                    slot.duration_minutes()
                );
            }
        }
    }
    Ok(())
}
