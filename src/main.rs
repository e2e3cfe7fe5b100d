mod classify;
mod cli;
mod error;
mod extract;
mod fmt;
mod grid;
mod infer;
mod models;
mod record;
mod scan;
mod settings;
mod stats;
mod token;

use clap::Parser;
use tracing_subscriber::{prelude::*, EnvFilter};

use cli::{Cli, Commands, ConfigCommands, ReportCommands};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry().with(filter).with(layer).init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            file,
            output,
            reference_date,
            max_clients,
            start_from,
        } => cli::extract::run(
            &file,
            &output,
            reference_date.as_deref(),
            max_clients,
            start_from,
        ),
        Commands::Report { command } => match command {
            ReportCommands::Overview { file } => cli::report::overview(&file),
            ReportCommands::Rankings { file, limit } => cli::report::rankings(&file, limit),
            ReportCommands::Dates { file } => cli::report::dates(&file),
            ReportCommands::Patterns { file } => cli::report::patterns(&file),
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Init => cli::config::init(),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
