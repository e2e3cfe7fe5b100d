use std::path::Path;

use chrono::NaiveDate;
use colored::Colorize;

use crate::error::{Result, TrainlogError};
use crate::extract::{extract_snapshot, ExtractOptions};
use crate::grid::load_grid;
use crate::settings::load_settings;

pub fn run(
    file: &str,
    output: &str,
    reference_date: Option<&str>,
    max_clients: Option<usize>,
    start_from: usize,
) -> Result<()> {
    let settings = load_settings();
    let reference = match reference_date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            TrainlogError::Settings(format!("--reference-date must be YYYY-MM-DD, got '{raw}'"))
        })?,
        None => settings.reference_date()?,
    };

    let grid = load_grid(Path::new(file), &settings.palette)?;
    let options = ExtractOptions {
        source: file.to_string(),
        reference,
        max_clients,
        start_from,
    };

    // Serialize fully before touching the output path: a failed run must not
    // leave a partial snapshot behind.
    let (snapshot, summary) = extract_snapshot(&grid, &settings, &options)?;
    let json = serde_json::to_string_pretty(&snapshot)?;
    std::fs::write(output, format!("{json}\n"))?;

    println!(
        "{} client(s) extracted from {}",
        summary.clients.to_string().green().bold(),
        file
    );
    if summary.duplicates_skipped > 0 {
        println!(
            "  {} duplicate client header(s) skipped",
            summary.duplicates_skipped
        );
    }
    if summary.opaque_dates > 0 {
        println!(
            "  {} date cell(s) kept verbatim (unparseable)",
            summary.opaque_dates.to_string().yellow()
        );
    }
    if summary.dateless_unpaid > 0 {
        println!(
            "  {} dateless unpaid cell(s) dropped",
            summary.dateless_unpaid
        );
    }
    println!("Snapshot written to {}", output.bold());

    Ok(())
}
