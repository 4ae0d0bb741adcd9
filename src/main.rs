use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use timew2clockify::error::Result;
use timew2clockify::model::Policy;
use timew2clockify::report::Format;

#[derive(Parser)]
#[command(
    name = "timew2clockify",
    version,
    about = "Migrate Timewarrior time entries to Clockify"
)]
struct Cli {
    /// Output format for the final report
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    format: Format,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate timewarrior entries into clockify
    Migrate {
        /// Path to the mapping configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Show what would be migrated without writing to clockify
        #[arg(long)]
        dry_run: bool,
        /// Start date for migration (YYYY-MM-DD, inclusive)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// End date for migration (YYYY-MM-DD, inclusive)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Which tag selects the client/project pair
        #[arg(long, value_enum, default_value = "first-tag")]
        policy: Policy,
        /// Never prompt; skip entries whose tag is not in the mapping
        #[arg(long)]
        non_interactive: bool,
    },
    /// Delete clockify entries within a date range
    Delete {
        /// Start date for deletion (YYYY-MM-DD, inclusive)
        #[arg(long)]
        start: NaiveDate,
        /// End date for deletion (YYYY-MM-DD, inclusive)
        #[arg(long)]
        end: NaiveDate,
        /// Show what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
        /// Ask for confirmation before deleting each entry
        #[arg(long)]
        interactive: bool,
    },
}

fn run(cli: Cli, format: Format) -> Result<()> {
    match cli.command {
        Commands::Migrate {
            config,
            dry_run,
            start,
            end,
            policy,
            non_interactive,
        } => timew2clockify::commands::migrate::run(
            config,
            dry_run,
            start,
            end,
            policy,
            non_interactive,
            format,
        ),
        Commands::Delete {
            start,
            end,
            dry_run,
            interactive,
        } => timew2clockify::commands::delete::run(start, end, dry_run, interactive, format),
    }
}

fn main() {
    let cli = Cli::parse();
    let format = cli.format;
    if let Err(e) = run(cli, format) {
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
