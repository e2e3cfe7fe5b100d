use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;

use crate::classify::classify;
use crate::error::{Result, TrainlogError};
use crate::grid::SheetGrid;
use crate::infer::Resolved;
use crate::models::{ClientEntry, Enhancement, Snapshot};
use crate::record::build_record;
use crate::scan::{client_window, historical_count, index_clients};
use crate::settings::Settings;

pub struct ExtractOptions {
    /// Source name used in diagnostics (usually the workbook path).
    pub source: String,
    pub reference: NaiveDate,
    pub max_clients: Option<usize>,
    pub start_from: usize,
}

/// Per-run accumulator, returned instead of being kept in module state.
#[derive(Debug, Default)]
pub struct ExtractSummary {
    pub clients: usize,
    pub duplicates_skipped: usize,
    /// Date cells kept verbatim because they would not parse.
    pub opaque_dates: usize,
    /// Dateless unpaid cells dropped during classification.
    pub dateless_unpaid: usize,
}

/// Scan the whole grid and build the snapshot document.
///
/// Fails with `InvalidStructure` when the sheet holds no client headers at
/// all; individual unparseable cells never abort the run.
pub fn extract_snapshot(
    grid: &SheetGrid,
    settings: &Settings,
    options: &ExtractOptions,
) -> Result<(Snapshot, ExtractSummary)> {
    let (anchors, duplicates_skipped) = index_clients(grid, settings);
    if anchors.is_empty() {
        return Err(TrainlogError::InvalidStructure(options.source.clone()));
    }

    let end = options
        .max_clients
        .map(|n| (options.start_from + n).min(anchors.len()))
        .unwrap_or(anchors.len());
    let start = options.start_from.min(end);

    let mut clients: BTreeMap<String, ClientEntry> = BTreeMap::new();
    let mut summary = ExtractSummary {
        duplicates_skipped,
        ..Default::default()
    };

    for index in start..end {
        let anchor = &anchors[index];
        let observations = client_window(grid, &anchors, index, settings);
        let classified = classify(&observations);
        let previous = historical_count(grid, anchor.row, settings);
        let record = build_record(
            &anchor.name,
            previous,
            &classified,
            options.reference,
            settings.recency_window_days,
        );

        summary.clients += 1;
        summary.dateless_unpaid += classified.dateless_unpaid as usize;
        summary.opaque_dates += record
            .paid_used
            .iter()
            .chain(record.unpaid.iter())
            .filter(|r| matches!(r, Resolved::Opaque(_)))
            .count();

        info!(
            client = %anchor.name,
            paid = record.paid_used.len(),
            unpaid = record.unpaid.len(),
            remaining = record.paid_remaining,
            "client processed"
        );
        clients.insert(record.name.clone(), record.to_entry());
    }

    let snapshot = Snapshot {
        clients,
        updated: chrono::Local::now().format("%Y-%m-%d").to_string(),
        date_enhancement: Enhancement {
            enabled: true,
            reference_date: options.reference.format("%Y-%m-%d").to_string(),
            logic: format!(
                "seed the year before the reference date, move years forward until dates \
                 are non-decreasing, shift an all-seed-year run forward one year when it \
                 ends within {} days of the reference",
                settings.recency_window_days
            ),
            format: "DD.MM.YYYY".to_string(),
        },
    };

    Ok((snapshot, summary))
}
