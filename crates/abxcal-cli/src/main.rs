use abxcal_core::Config;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "abxcal", version, about = "Antibiotic treatment calendar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Appointment management
    Event {
        #[command(subcommand)]
        action: commands::event::EventAction,
    },
    /// Free slot suggestions
    Slot {
        #[command(subcommand)]
        action: commands::slot::SlotAction,
    },
    /// Contact management
    Contact {
        #[command(subcommand)]
        action: commands::contact::ContactAction,
    },
    /// Antibiotic durations
    Antibiotic {
        #[command(subcommand)]
        action: commands::antibiotic::AntibioticAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Log to stderr so stdout stays machine-readable. `RUST_LOG` overrides
/// the configured level.
fn init_tracing() {
    let level = Config::load_or_default().logging.level;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Event { action } => commands::event::run(action),
        Commands::Slot { action } => commands::slot::run(action),
        Commands::Contact { action } => commands::contact::run(action),
        Commands::Antibiotic { action } => commands::antibiotic::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
