//! Settings commands. Keys are dot paths such as `scheduling.day_start_hour`.

use abxcal_core::Config;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting
    Get {
        /// Dot-separated key, e.g. scheduling.day_end_hour
        key: String,
    },
    /// Change one setting; the working-day window is validated
    Set {
        key: String,
        value: String,
    },
    /// Print every setting as `key = value`
    List {
        #[arg(long)]
        json: bool,
    },
    /// Restore the default working day, duration and log level
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config
                .get(&key)
                .ok_or_else(|| format!("unknown setting: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            tracing::info!(%key, %value, "setting changed");
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List { json } => {
            let config = Config::load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                for (key, value) in config.entries() {
                    println!("{key} = {value}");
                }
            }
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            let scheduling = &config.scheduling;
            println!(
                "Settings reset: slots searched {:02}:00-{:02}:00, {}h default duration",
                scheduling.day_start_hour, scheduling.day_end_hour, scheduling.default_duration_hours
            );
        }
    }
    Ok(())
}
