pub mod config;
pub mod extract;
pub mod report;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "trainlog",
    about = "Extract training-session records from a colored attendance spreadsheet."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract client sessions from an XLSX attendance sheet into a JSON snapshot.
    Extract {
        /// Path to the attendance workbook
        file: String,
        /// Output JSON path
        #[arg(long, default_value = "sessions.json")]
        output: String,
        /// Reference date for year inference: YYYY-MM-DD (default from settings)
        #[arg(long = "reference-date")]
        reference_date: Option<String>,
        /// Process at most N clients
        #[arg(long = "max-clients")]
        max_clients: Option<usize>,
        /// Skip the first N clients in the sheet
        #[arg(long = "start-from", default_value = "0")]
        start_from: usize,
    },
    /// Aggregate statistics over an extracted snapshot.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Inspect or initialize settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Client, session and revenue totals.
    Overview {
        /// Snapshot produced by `trainlog extract`
        #[arg(long, default_value = "sessions.json")]
        file: String,
    },
    /// Top clients by all-time, current, previous and unpaid sessions.
    Rankings {
        #[arg(long, default_value = "sessions.json")]
        file: String,
        /// Rows per board
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Date-range analytics: busiest months and weekdays.
    Dates {
        #[arg(long, default_value = "sessions.json")]
        file: String,
    },
    /// Session-count, payment and remaining-session distributions.
    Patterns {
        #[arg(long, default_value = "sessions.json")]
        file: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings.
    Show,
    /// Write a settings file populated with defaults.
    Init,
}
