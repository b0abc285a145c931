use abxcal_core::Antibiotic;
use clap::Subcommand;

use super::{open_calendar, save_contacts};

/// One administration never runs past a full day.
const MAX_TREATMENT_HOURS: f64 = 24.0;

#[derive(Subcommand)]
pub enum AntibioticAction {
    /// Register an antibiotic or change its duration
    Set {
        name: String,
        /// Hours per administration, at most 24
        hours: f64,
    },
    /// List antibiotics
    List {
        #[arg(long)]
        json: bool,
    },
    /// Remove an antibiotic
    Remove { name: String },
}

pub fn run(action: AntibioticAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut calendar = open_calendar()?;

    match action {
        AntibioticAction::Set { name, hours } => {
            if !hours.is_finite() || hours <= 0.0 || hours > MAX_TREATMENT_HOURS {
                return Err(format!(
                    "duration must be more than 0 and at most {MAX_TREATMENT_HOURS} hours, got {hours}"
                )
                .into());
            }
            calendar.directory_mut().upsert_antibiotic(Antibiotic {
                name: name.clone(),
                duration: hours,
            });
            save_contacts(&mut calendar)?;
            println!("Antibiotic saved: {name} ({hours}h)");
        }
        AntibioticAction::List { json } => {
            let antibiotics = calendar.directory().antibiotics();
            if json {
                println!("{}", serde_json::to_string_pretty(&antibiotics)?);
            } else if antibiotics.is_empty() {
                println!("No antibiotics");
            } else {
                for antibiotic in antibiotics {
                    println!("{}  {}h", antibiotic.name, antibiotic.duration);
                }
            }
        }
        AntibioticAction::Remove { name } => {
            if calendar.directory_mut().remove_antibiotic(&name).is_none() {
                return Err(format!("antibiotic not found: {name}").into());
            }
            save_contacts(&mut calendar)?;
            println!("Antibiotic removed: {name}");
        }
    }
    Ok(())
}
