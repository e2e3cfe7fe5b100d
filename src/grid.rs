use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, TrainlogError};
use crate::settings::Palette;

/// Disposition of a cell's fill color. Everything that is not a close match
/// for the paid/unpaid reference colors (including default white/black and
/// unfilled cells) is neutral and ignored by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorClass {
    Paid,
    Unpaid,
    Neutral,
}

#[derive(Debug, Clone)]
pub struct GridCell {
    pub value: Option<String>,
    pub color: ColorClass,
}

/// Read-only 2D grid of cell values and color classes, 1-based coordinates.
/// The rest of the pipeline depends only on this shape, not on any
/// spreadsheet-library API.
#[derive(Debug)]
pub struct SheetGrid {
    cells: HashMap<(u32, u32), GridCell>,
    max_row: u32,
    max_col: u32,
}

impl SheetGrid {
    pub fn new(max_row: u32, max_col: u32) -> Self {
        Self {
            cells: HashMap::new(),
            max_row,
            max_col,
        }
    }

    pub fn insert(&mut self, row: u32, col: u32, value: Option<String>, color: ColorClass) {
        self.max_row = self.max_row.max(row);
        self.max_col = self.max_col.max(col);
        self.cells.insert((row, col), GridCell { value, color });
    }

    pub fn value(&self, row: u32, col: u32) -> Option<&str> {
        self.cells
            .get(&(row, col))
            .and_then(|c| c.value.as_deref())
    }

    pub fn color(&self, row: u32, col: u32) -> ColorClass {
        self.cells
            .get(&(row, col))
            .map(|c| c.color)
            .unwrap_or(ColorClass::Neutral)
    }

    pub fn max_row(&self) -> u32 {
        self.max_row
    }

    #[allow(dead_code)]
    pub fn max_col(&self) -> u32 {
        self.max_col
    }
}

/// Nearest-match classification of an ARGB fill against the palette.
pub fn classify_argb(argb: &str, palette: &Palette) -> ColorClass {
    let argb = argb.to_ascii_uppercase();
    // Default/empty fills never classify, whatever the tolerance.
    if argb == "00000000" || argb == "FFFFFFFF" {
        return ColorClass::Neutral;
    }
    let Some(rgb) = parse_rgb(&argb) else {
        return ColorClass::Neutral;
    };
    let Some(paid_ref) = parse_rgb(&palette.paid_argb) else {
        return ColorClass::Neutral;
    };
    let Some(unpaid_ref) = parse_rgb(&palette.unpaid_argb) else {
        return ColorClass::Neutral;
    };

    let d_paid = channel_distance(rgb, paid_ref);
    let d_unpaid = channel_distance(rgb, unpaid_ref);
    let (class, dist) = if d_paid <= d_unpaid {
        (ColorClass::Paid, d_paid)
    } else {
        (ColorClass::Unpaid, d_unpaid)
    };
    if dist <= palette.tolerance {
        class
    } else {
        ColorClass::Neutral
    }
}

/// Last six hex digits of an ARGB (or RGB) string as channels.
fn parse_rgb(argb: &str) -> Option<(u8, u8, u8)> {
    let hex = argb.trim();
    if hex.len() < 6 {
        return None;
    }
    let tail = &hex[hex.len() - 6..];
    let r = u8::from_str_radix(&tail[0..2], 16).ok()?;
    let g = u8::from_str_radix(&tail[2..4], 16).ok()?;
    let b = u8::from_str_radix(&tail[4..6], 16).ok()?;
    Some((r, g, b))
}

fn channel_distance(a: (u8, u8, u8), b: (u8, u8, u8)) -> u32 {
    a.0.abs_diff(b.0) as u32 + a.1.abs_diff(b.1) as u32 + a.2.abs_diff(b.2) as u32
}

/// Load the first worksheet of an XLSX workbook into a [`SheetGrid`].
pub fn load_grid(path: &Path, palette: &Palette) -> Result<SheetGrid> {
    if !path.exists() {
        return Err(TrainlogError::UnreadableInput {
            path: path.display().to_string(),
            reason: "file not found".to_string(),
        });
    }
    let book = umya_spreadsheet::reader::xlsx::read(path).map_err(|e| {
        TrainlogError::UnreadableInput {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
    })?;
    let sheet = book.get_sheet(&0).ok_or_else(|| TrainlogError::UnreadableInput {
        path: path.display().to_string(),
        reason: "workbook has no sheets".to_string(),
    })?;

    let mut grid = SheetGrid::new(sheet.get_highest_row(), sheet.get_highest_column());
    for cell in sheet.get_cell_collection() {
        let row = *cell.get_coordinate().get_row_num();
        let col = *cell.get_coordinate().get_col_num();
        let raw = cell.get_value();
        let value = {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        let color = match cell_fill_argb(cell) {
            Some(argb) => classify_argb(&argb, palette),
            None => ColorClass::Neutral,
        };
        if value.is_some() || color != ColorClass::Neutral {
            grid.insert(row, col, value, color);
        }
    }
    Ok(grid)
}

/// Pattern-fill foreground color of a cell, when one is set.
fn cell_fill_argb(cell: &umya_spreadsheet::Cell) -> Option<String> {
    let style = cell.get_style();
    let Some(fill) = style.get_fill() else {
        return None;
    };
    let Some(pattern) = fill.get_pattern_fill() else {
        return None;
    };
    let Some(color) = pattern.get_foreground_color() else {
        return None;
    };
    let argb = color.get_argb();
    if argb.is_empty() {
        None
    } else {
        Some(argb.to_ascii_uppercase())
    }
}
