use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::fmt;
use crate::token::Token;

/// A token after year assignment. Opaque entries keep their literal and sit
/// at their original list position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Date(NaiveDate),
    Opaque(String),
}

impl Resolved {
    pub fn render(&self) -> String {
        match self {
            Resolved::Date(d) => fmt::session_date(*d),
            Resolved::Opaque(s) => s.clone(),
        }
    }

    /// Sort key: resolved date, or the epoch minimum for opaque entries.
    pub fn sort_key(&self) -> NaiveDate {
        match self {
            Resolved::Date(d) => *d,
            Resolved::Opaque(_) => fmt::epoch_min(),
        }
    }
}

/// How many consecutive years to try when fitting a day/month. Only Feb 29
/// ever needs more than two; eight covers any leap-year gap.
const YEAR_HORIZON: i32 = 8;

/// Assign years to an ordered run of day/month tokens so the resolved
/// sequence is non-decreasing ("anchor + forward-correct").
///
/// The first dated token is seeded at the year before `reference`, on the
/// conservative assumption that tracking began in a prior cycle. Every later
/// token starts from the previous resolved year and moves the year forward,
/// never back, until its date no longer precedes the previous one.
///
/// Post-pass: when the whole run stayed in the seed year and its last date,
/// moved forward one year, lands within `recency_window_days` at or before
/// the reference date, the run was almost certainly current-cycle activity
/// and every date is shifted forward one year.
///
/// This is a heuristic, not a guarantee: it assumes scan order reflects true
/// attendance order and that no client goes a full year without a session
/// inside the window. Violations produce a wrong-but-monotonic year.
pub fn assign_years(tokens: &[Token], reference: NaiveDate, recency_window_days: i64) -> Vec<Resolved> {
    let seed_year = reference.year() - 1;
    let mut out: Vec<Resolved> = Vec::with_capacity(tokens.len());
    let mut prev: Option<NaiveDate> = None;

    for token in tokens {
        match token {
            Token::Opaque(s) => out.push(Resolved::Opaque(s.clone())),
            Token::Date(t) => {
                let start = prev.map(|p| p.year()).unwrap_or(seed_year);
                match fit_year(t.day, t.month, start, prev) {
                    Some(date) => {
                        prev = Some(date);
                        out.push(Resolved::Date(date));
                    }
                    None => {
                        // No admissible year in the horizon (Feb 29 against a
                        // hostile previous date). Degrade to opaque.
                        debug!(day = t.day, month = t.month, "no admissible year, kept verbatim");
                        out.push(Resolved::Opaque(format!("{}.{}", t.day, t.month)));
                    }
                }
            }
        }
    }

    if should_shift(&out, seed_year, reference, recency_window_days) {
        for entry in &mut out {
            if let Resolved::Date(d) = entry {
                *d = add_one_year(*d);
            }
        }
    }

    out
}

/// Smallest year >= `start` where day/month is a valid date not preceding
/// `floor`. Never looks backwards.
fn fit_year(day: u32, month: u32, start: i32, floor: Option<NaiveDate>) -> Option<NaiveDate> {
    for year in start..start + YEAR_HORIZON {
        if let Some(candidate) = NaiveDate::from_ymd_opt(year, month, day) {
            if floor.map_or(true, |f| candidate >= f) {
                return Some(candidate);
            }
        }
    }
    None
}

fn should_shift(
    resolved: &[Resolved],
    seed_year: i32,
    reference: NaiveDate,
    recency_window_days: i64,
) -> bool {
    let dates: Vec<NaiveDate> = resolved
        .iter()
        .filter_map(|r| match r {
            Resolved::Date(d) => Some(*d),
            Resolved::Opaque(_) => None,
        })
        .collect();
    let Some(last) = dates.last().copied() else {
        return false;
    };
    if !dates.iter().all(|d| d.year() == seed_year) {
        return false;
    }
    let shifted = add_one_year(last);
    let gap = (reference - shifted).num_days();
    (0..=recency_window_days).contains(&gap)
}

/// Feb 29 clamps to Feb 28 when the target year is not a leap year.
fn add_one_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year() + 1, date.month(), date.day())
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(date.year() + 1, 2, 28).unwrap())
}
