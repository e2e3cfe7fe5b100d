use colored::Colorize;

use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, Settings};

pub fn show() -> Result<()> {
    let settings = load_settings();
    let path = settings_path();
    let origin = if path.exists() {
        path.display().to_string()
    } else {
        "built-in defaults".to_string()
    };
    println!("{} ({origin})", "Settings".bold());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

pub fn init() -> Result<()> {
    let path = settings_path();
    if path.exists() {
        println!("Settings file already exists at {}", path.display());
        return Ok(());
    }
    save_settings(&Settings::default())?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}
