use chrono::Datelike;

/// A day/month pair lifted out of a cell, before any year has been assigned.
///
/// `year_hint` is carried when the cell itself named a year (ISO string or a
/// native date serial). It is a secondary signal for inference, never final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub day: u32,
    pub month: u32,
    pub year_hint: Option<i32>,
}

/// Outcome of parsing one non-empty cell value.
///
/// `Opaque` keeps the original literal unchanged; it flows through the
/// pipeline at its position but is excluded from date-sensitive logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Date(RawToken),
    Opaque(String),
}

impl Token {
    pub fn is_date(&self) -> bool {
        matches!(self, Token::Date(_))
    }
}

// Excel serials in this band cover 1954..2118, wide enough for any
// attendance sheet while rejecting bare counters like "150".
const SERIAL_MIN: f64 = 20_000.0;
const SERIAL_MAX: f64 = 80_000.0;

/// Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug).
pub fn excel_serial_to_date(serial: f64) -> chrono::NaiveDate {
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    base + chrono::Duration::days(serial as i64)
}

/// Parse a raw cell value into a token. Returns `None` for blank cells.
///
/// Accepted shapes, in order:
/// - a numeric value in the Excel date-serial band;
/// - `YYYY-MM-DD[ time]` (hyphenated, at least 10 characters);
/// - `day.month`.
/// Anything else, including a day/month pair that is not a valid calendar
/// date in any year, degrades to `Token::Opaque` with the literal preserved.
pub fn parse_cell(raw: &str) -> Option<Token> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(n) = s.parse::<f64>() {
        if (SERIAL_MIN..=SERIAL_MAX).contains(&n) {
            let date = excel_serial_to_date(n);
            return Some(Token::Date(RawToken {
                day: date.day(),
                month: date.month(),
                year_hint: Some(date.year()),
            }));
        }
        return Some(Token::Opaque(s.to_string()));
    }

    if s.contains('-') && s.len() >= 10 {
        return Some(parse_iso_like(s).unwrap_or_else(|| Token::Opaque(s.to_string())));
    }

    if s.matches('.').count() == 1 {
        return Some(parse_day_month(s).unwrap_or_else(|| Token::Opaque(s.to_string())));
    }

    Some(Token::Opaque(s.to_string()))
}

fn parse_iso_like(s: &str) -> Option<Token> {
    // "2024-06-10 00:00:00" → drop the time component first.
    let date_part = s.split_whitespace().next()?;
    let parts: Vec<&str> = date_part.split('-').collect();
    if parts.len() < 3 {
        return None;
    }
    let year: i32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let day: u32 = parts[2].parse().ok()?;
    plausible(day, month).then_some(Token::Date(RawToken {
        day,
        month,
        year_hint: Some(year),
    }))
}

fn parse_day_month(s: &str) -> Option<Token> {
    let (d, m) = s.split_once('.')?;
    let day: u32 = d.trim().parse().ok()?;
    let month: u32 = m.trim().parse().ok()?;
    plausible(day, month).then_some(Token::Date(RawToken {
        day,
        month,
        year_hint: None,
    }))
}

/// True when the day/month pair forms a valid date in at least one year
/// (February is allowed 29 days; leap-year fitting happens at inference).
fn plausible(day: u32, month: u32) -> bool {
    if !(1..=12).contains(&month) || day == 0 {
        return false;
    }
    let max = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => 29,
    };
    day <= max
}
