use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainlogError};

/// Reference fill colors for session cells plus the matching tolerance.
/// Classification is nearest-match within tolerance, so slightly off-palette
/// sheets still classify; anything further is neutral.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    pub paid_argb: String,
    pub unpaid_argb: String,
    /// Maximum summed per-channel distance to the nearest reference color.
    pub tolerance: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            paid_argb: "FF00FF00".to_string(),
            unpaid_argb: "FFFF9900".to_string(),
            tolerance: 180,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// "Today" for year inference: YYYY-MM-DD. Fixed default keeps snapshots
    /// reproducible across runs.
    #[serde(default = "default_reference_date")]
    pub reference_date: String,
    /// Day-count window for the one-year forward shift of an all-seed-year run.
    #[serde(default = "default_recency_window")]
    pub recency_window_days: i64,
    /// Maximum rows scanned below a client header.
    #[serde(default = "default_row_cap")]
    pub row_cap: u32,
    /// Text marking a client header row.
    #[serde(default = "default_header_marker")]
    pub header_marker: String,
    /// Column holding the header marker (1-based; B).
    #[serde(default = "default_marker_column")]
    pub marker_column: u32,
    /// Column holding the client name (C).
    #[serde(default = "default_name_column")]
    pub name_column: u32,
    /// First and last session columns (D through M).
    #[serde(default = "default_first_session_column")]
    pub first_session_column: u32,
    #[serde(default = "default_last_session_column")]
    pub last_session_column: u32,
    #[serde(default)]
    pub palette: Palette,
    /// Accepted range for a standalone historical session count near the
    /// header. Values outside are ignored.
    #[serde(default = "default_history_min")]
    pub history_min: u32,
    #[serde(default = "default_history_max")]
    pub history_max: u32,
    /// Per-session price used for the revenue lines in `report overview`.
    #[serde(default = "default_session_price")]
    pub session_price: u64,
}

fn default_reference_date() -> String {
    "2025-06-18".to_string()
}
fn default_recency_window() -> i64 {
    90
}
fn default_row_cap() -> u32 {
    50
}
fn default_header_marker() -> String {
    "Numele".to_string()
}
fn default_marker_column() -> u32 {
    2
}
fn default_name_column() -> u32 {
    3
}
fn default_first_session_column() -> u32 {
    4
}
fn default_last_session_column() -> u32 {
    13
}
fn default_history_min() -> u32 {
    10
}
fn default_history_max() -> u32 {
    2000
}
fn default_session_price() -> u64 {
    100
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reference_date: default_reference_date(),
            recency_window_days: default_recency_window(),
            row_cap: default_row_cap(),
            header_marker: default_header_marker(),
            marker_column: default_marker_column(),
            name_column: default_name_column(),
            first_session_column: default_first_session_column(),
            last_session_column: default_last_session_column(),
            palette: Palette::default(),
            history_min: default_history_min(),
            history_max: default_history_max(),
            session_price: default_session_price(),
        }
    }
}

impl Settings {
    pub fn reference_date(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.reference_date, "%Y-%m-%d").map_err(|_| {
            TrainlogError::Settings(format!(
                "reference_date must be YYYY-MM-DD, got '{}'",
                self.reference_date
            ))
        })
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("trainlog")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Missing or unreadable settings fall back to defaults; a half-written file
/// never blocks an extraction run.
pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| TrainlogError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}
