mod commands;
mod logging;
mod render;
mod utils;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ttsync_core::config::SyncConfig;

#[derive(Parser)]
#[command(name = "ttsync")]
#[command(about = "Mirror a university timetable into a Google calendar")]
struct Cli {
    /// Show every change and log each remote call
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.config/ttsync/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to Google
    Auth,
    /// Bring the calendar in line with the timetable
    Sync {
        /// Show what would change without touching the calendar
        #[arg(long)]
        dry_run: bool,

        /// Delete every event in the calendar and recreate the timetable
        #[arg(long)]
        force: bool,

        /// Timetable export to read instead of the configured one
        #[arg(long)]
        timetable: Option<PathBuf>,
    },
    /// Show changes between the timetable and the calendar
    Status {
        /// Timetable export to read instead of the configured one
        #[arg(long)]
        timetable: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => SyncConfig::load_from(path)?,
        None => SyncConfig::load()?,
    };

    match cli.command {
        Commands::Auth => commands::auth::run().await?,
        Commands::Status { timetable } => {
            commands::status::run(&config, timetable, cli.verbose).await?
        }
        Commands::Sync {
            dry_run,
            force,
            timetable,
        } => {
            let report = commands::sync::run(
                &config,
                commands::sync::SyncArgs {
                    timetable,
                    dry_run,
                    force,
                    verbose: cli.verbose,
                },
            )
            .await?;

            if !report.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
