use chrono::NaiveDate;

/// Format a date in the snapshot's `DD.MM.YYYY` convention.
pub fn session_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Parse a `DD.MM.YYYY` string back into a date.
pub fn parse_session_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let year: i32 = parts[2].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Sort key floor for entries that carry no parseable date. Unparseable
/// literals sort first, deterministically.
pub fn epoch_min() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()
}

/// Sort key for a snapshot date string: parsed date, or the epoch minimum.
pub fn date_sort_key(s: &str) -> NaiveDate {
    parse_session_date(s).unwrap_or_else(epoch_min)
}

/// Proportional bar for console distribution tables.
pub fn bar(count: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let len = ((count as f64 / max as f64) * width as f64) as usize;
    "\u{2588}".repeat(len)
}
