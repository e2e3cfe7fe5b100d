use std::collections::HashSet;

use tracing::warn;

use crate::grid::{ColorClass, SheetGrid};
use crate::models::CellObservation;
use crate::settings::Settings;
use crate::token::parse_cell;

/// A client header located in phase 1: the marker row and the name next to it.
#[derive(Debug, Clone)]
pub struct ClientAnchor {
    pub row: u32,
    pub name: String,
}

/// Phase 1: index every client header across the grid, in row order.
///
/// Repeated names (by trimmed, case-folded comparison) keep their first
/// occurrence only; the duplicate count is returned for the run summary.
pub fn index_clients(grid: &SheetGrid, settings: &Settings) -> (Vec<ClientAnchor>, usize) {
    let mut anchors = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut duplicates = 0usize;

    for row in 1..=grid.max_row() {
        let Some(marker) = grid.value(row, settings.marker_column) else {
            continue;
        };
        if !marker.contains(&settings.header_marker) {
            continue;
        }
        let Some(name) = grid.value(row, settings.name_column) else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let normalized = name.to_lowercase();
        if !seen.insert(normalized) {
            warn!(name, row, "duplicate client header skipped");
            duplicates += 1;
            continue;
        }
        anchors.push(ClientAnchor {
            row,
            name: name.to_string(),
        });
    }

    (anchors, duplicates)
}

/// Phase 2: the bounded observation window for one indexed client.
///
/// Rows run from just under the header to the next header or the row cap,
/// whichever comes first; within a row, session columns left to right. Only
/// colored cells become observations; their date neighbors are read directly
/// from the grid, so a date row just outside the window still resolves.
pub fn client_window(
    grid: &SheetGrid,
    anchors: &[ClientAnchor],
    index: usize,
    settings: &Settings,
) -> Vec<CellObservation> {
    let anchor = &anchors[index];
    let next_row = anchors
        .get(index + 1)
        .map(|a| a.row)
        .unwrap_or(grid.max_row() + 1);
    let end = (anchor.row + settings.row_cap).min(next_row);

    let mut observations = Vec::new();
    for row in (anchor.row + 1)..end {
        for col in settings.first_session_column..=settings.last_session_column {
            let color = grid.color(row, col);
            if color == ColorClass::Neutral {
                continue;
            }
            observations.push(CellObservation {
                row,
                column: col,
                color,
                text: grid.value(row, col).map(str::to_string),
                date_below: grid.value(row + 1, col).and_then(parse_cell),
                date_above: row
                    .checked_sub(1)
                    .and_then(|r| grid.value(r, col))
                    .and_then(parse_cell),
            });
        }
    }
    observations
}

/// A standalone integer near the client header seeds the historical session
/// count. Only neutral cells in the header row and the one below qualify,
/// and only within the configured plausibility range.
pub fn historical_count(grid: &SheetGrid, anchor_row: u32, settings: &Settings) -> u32 {
    for row in anchor_row..=anchor_row + 1 {
        for col in settings.marker_column..=settings.last_session_column {
            if row == anchor_row && (col == settings.marker_column || col == settings.name_column) {
                continue;
            }
            if grid.color(row, col) != ColorClass::Neutral {
                continue;
            }
            let Some(value) = grid.value(row, col) else {
                continue;
            };
            if let Some(n) = parse_plain_integer(value) {
                if (settings.history_min..=settings.history_max).contains(&n) {
                    return n;
                }
            }
        }
    }
    0
}

fn parse_plain_integer(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u32>() {
        return Some(n);
    }
    // Spreadsheets sometimes store counts as "30.0".
    match s.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 => Some(f as u32),
        _ => None,
    }
}
