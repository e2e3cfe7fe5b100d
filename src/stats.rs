use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{Result, TrainlogError};
use crate::fmt::parse_session_date;
use crate::models::Snapshot;

/// Load a snapshot produced by `extract`. Missing file and malformed JSON
/// both name the path in the diagnostic.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        return Err(TrainlogError::UnreadableInput {
            path: path.display().to_string(),
            reason: "file not found (run `trainlog extract` first)".to_string(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| TrainlogError::UnreadableInput {
        path: path.display().to_string(),
        reason: format!("invalid snapshot JSON: {e}"),
    })
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Overview {
    pub total_clients: usize,
    pub active_clients: usize,
    pub clients_with_previous: usize,
    pub clients_with_unpaid: usize,
    pub clients_with_notes: usize,
    pub total_current: u64,
    pub total_all_time: u64,
    pub total_previous: u64,
    pub total_paid_used: u64,
    pub total_remaining: u64,
    pub total_unpaid: u64,
    pub revenue_paid: u64,
    pub revenue_remaining: u64,
    pub outstanding_unpaid: u64,
    pub session_price: u64,
}

pub fn overview(snapshot: &Snapshot, session_price: u64) -> Overview {
    let mut o = Overview {
        total_clients: snapshot.clients.len(),
        session_price,
        ..Default::default()
    };
    for entry in snapshot.clients.values() {
        let s = &entry.stats;
        if s.total_current > 0 {
            o.active_clients += 1;
        }
        if s.previous_completed > 0 {
            o.clients_with_previous += 1;
        }
        if s.current_unpaid > 0 {
            o.clients_with_unpaid += 1;
        }
        if !entry.extra.is_empty() {
            o.clients_with_notes += 1;
        }
        o.total_current += s.total_current as u64;
        o.total_all_time += s.total_all_time as u64;
        o.total_previous += s.previous_completed as u64;
        o.total_paid_used += s.current_paid_used as u64;
        o.total_remaining += s.current_remaining as u64;
        o.total_unpaid += s.current_unpaid as u64;
    }
    o.revenue_paid = o.total_paid_used * session_price;
    o.revenue_remaining = o.total_remaining * session_price;
    o.outstanding_unpaid = o.total_unpaid * session_price;
    o
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Rankings {
    pub top_all_time: Vec<(String, u32)>,
    pub top_current: Vec<(String, u32)>,
    pub top_previous: Vec<(String, u32)>,
    pub top_unpaid: Vec<(String, u32)>,
}

pub fn rankings(snapshot: &Snapshot, limit: usize) -> Rankings {
    let top = |metric: fn(&crate::models::ClientStats) -> u32, nonzero: bool| {
        let mut rows: Vec<(String, u32)> = snapshot
            .clients
            .iter()
            .map(|(name, entry)| (name.clone(), metric(&entry.stats)))
            .filter(|(_, n)| !nonzero || *n > 0)
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        rows.truncate(limit);
        rows
    };
    Rankings {
        top_all_time: top(|s| s.total_all_time, false),
        top_current: top(|s| s.total_current, false),
        top_previous: top(|s| s.previous_completed, true),
        top_unpaid: top(|s| s.current_unpaid, true),
    }
}

// ---------------------------------------------------------------------------
// Date analytics
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct DateAnalytics {
    pub total_dated: usize,
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
    /// Sessions per YYYY-MM, ordered.
    pub monthly: BTreeMap<String, u64>,
    /// Sessions per weekday, Monday first.
    pub weekdays: [(Weekday, u64); 7],
    pub busiest_month: Option<(String, u64)>,
    pub busiest_weekday: Option<(Weekday, u64)>,
}

pub fn date_analytics(snapshot: &Snapshot) -> DateAnalytics {
    let mut monthly: BTreeMap<String, u64> = BTreeMap::new();
    let mut weekday_counts: BTreeMap<u8, u64> = BTreeMap::new();
    let mut all: Vec<NaiveDate> = Vec::new();

    for entry in snapshot.clients.values() {
        for raw in entry.paid.iter().chain(entry.unpaid.iter()) {
            // Opaque literals carry no date and are skipped here.
            let Some(date) = parse_session_date(raw) else {
                continue;
            };
            all.push(date);
            *monthly.entry(date.format("%Y-%m").to_string()).or_default() += 1;
            *weekday_counts
                .entry(date.weekday().num_days_from_monday() as u8)
                .or_default() += 1;
        }
    }

    all.sort();

    let order = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
    let weekdays = order.map(|wd| {
        (
            wd,
            weekday_counts
                .get(&(wd.num_days_from_monday() as u8))
                .copied()
                .unwrap_or(0),
        )
    });

    let busiest_month = monthly
        .iter()
        .max_by_key(|(_, &n)| n)
        .map(|(m, &n)| (m.clone(), n));
    let busiest_weekday = weekdays
        .iter()
        .max_by_key(|(_, n)| *n)
        .filter(|(_, n)| *n > 0)
        .copied();

    DateAnalytics {
        total_dated: all.len(),
        first: all.first().copied(),
        last: all.last().copied(),
        monthly,
        weekdays,
        busiest_month,
        busiest_weekday,
    }
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Patterns {
    pub session_ranges: Vec<(&'static str, u64)>,
    pub payment_patterns: Vec<(&'static str, u64)>,
    pub remaining_ranges: Vec<(&'static str, u64)>,
}

const SESSION_RANGES: &[(&str, u32, u32)] = &[
    ("0 sessions", 0, 0),
    ("1-5 sessions", 1, 5),
    ("6-10 sessions", 6, 10),
    ("11-20 sessions", 11, 20),
    ("21-50 sessions", 21, 50),
    ("51-100 sessions", 51, 100),
    ("100+ sessions", 101, u32::MAX),
];

const REMAINING_RANGES: &[(&str, u32, u32)] = &[
    ("0 remaining", 0, 0),
    ("1-5 remaining", 1, 5),
    ("6-10 remaining", 6, 10),
    ("11-20 remaining", 11, 20),
    ("20+ remaining", 21, u32::MAX),
];

pub fn patterns(snapshot: &Snapshot) -> Patterns {
    let mut session_ranges: Vec<(&'static str, u64)> =
        SESSION_RANGES.iter().map(|&(label, _, _)| (label, 0)).collect();
    let mut remaining_ranges: Vec<(&'static str, u64)> =
        REMAINING_RANGES.iter().map(|&(label, _, _)| (label, 0)).collect();
    let mut payment_patterns: Vec<(&'static str, u64)> = vec![
        ("Only paid", 0),
        ("Only unpaid", 0),
        ("Mixed payment", 0),
        ("No sessions", 0),
    ];

    for entry in snapshot.clients.values() {
        let s = &entry.stats;
        for (i, &(_, lo, hi)) in SESSION_RANGES.iter().enumerate() {
            if (lo..=hi).contains(&s.total_current) {
                session_ranges[i].1 += 1;
                break;
            }
        }
        for (i, &(_, lo, hi)) in REMAINING_RANGES.iter().enumerate() {
            if (lo..=hi).contains(&s.current_remaining) {
                remaining_ranges[i].1 += 1;
                break;
            }
        }
        let paid = s.current_paid_used + s.current_remaining;
        let slot = if s.total_current == 0 {
            3
        } else if paid > 0 && s.current_unpaid == 0 {
            0
        } else if paid == 0 && s.current_unpaid > 0 {
            1
        } else {
            2
        };
        payment_patterns[slot].1 += 1;
    }

    Patterns {
        session_ranges,
        payment_patterns,
        remaining_ranges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClientEntry, ClientStats, Enhancement};

    fn entry(
        paid: &[&str],
        unpaid: &[&str],
        previous: u32,
        remaining: u32,
    ) -> ClientEntry {
        let stats = ClientStats {
            previous_completed: previous,
            current_paid_used: paid.len() as u32,
            current_remaining: remaining,
            current_unpaid: unpaid.len() as u32,
            total_current: paid.len() as u32 + remaining + unpaid.len() as u32,
            total_all_time: previous + paid.len() as u32 + remaining + unpaid.len() as u32,
        };
        ClientEntry {
            paid: paid.iter().map(|s| s.to_string()).collect(),
            unpaid: unpaid.iter().map(|s| s.to_string()).collect(),
            stats,
            extra: vec![],
        }
    }

    fn snapshot(clients: Vec<(&str, ClientEntry)>) -> Snapshot {
        Snapshot {
            clients: clients
                .into_iter()
                .map(|(n, e)| (n.to_string(), e))
                .collect(),
            updated: "2025-06-18".to_string(),
            date_enhancement: Enhancement {
                enabled: true,
                reference_date: "2025-06-18".to_string(),
                logic: String::new(),
                format: "DD.MM.YYYY".to_string(),
            },
        }
    }

    #[test]
    fn test_overview_totals() {
        let snap = snapshot(vec![
            ("Ana", entry(&["10.01.2024", "15.01.2024"], &["20.01.2024"], 30, 2)),
            ("Dan", entry(&[], &[], 0, 0)),
        ]);
        let o = overview(&snap, 100);
        assert_eq!(o.total_clients, 2);
        assert_eq!(o.active_clients, 1);
        assert_eq!(o.clients_with_previous, 1);
        assert_eq!(o.clients_with_unpaid, 1);
        assert_eq!(o.total_current, 5);
        assert_eq!(o.total_all_time, 35);
        assert_eq!(o.revenue_paid, 200);
        assert_eq!(o.outstanding_unpaid, 100);
    }

    #[test]
    fn test_rankings_sorted_and_filtered() {
        let snap = snapshot(vec![
            ("Ana", entry(&["10.01.2024"], &[], 50, 0)),
            ("Dan", entry(&["10.01.2024", "11.01.2024"], &["12.01.2024"], 0, 0)),
            ("Eva", entry(&[], &[], 0, 0)),
        ]);
        let r = rankings(&snap, 10);
        assert_eq!(r.top_all_time[0].0, "Ana");
        assert_eq!(r.top_current[0], ("Dan".to_string(), 3));
        // Zero rows are dropped from the unpaid/previous boards.
        assert_eq!(r.top_unpaid.len(), 1);
        assert_eq!(r.top_previous.len(), 1);
    }

    #[test]
    fn test_rankings_ties_break_by_name() {
        let snap = snapshot(vec![
            ("Dan", entry(&["10.01.2024"], &[], 0, 0)),
            ("Ana", entry(&["11.01.2024"], &[], 0, 0)),
        ]);
        let r = rankings(&snap, 10);
        assert_eq!(r.top_current[0].0, "Ana");
    }

    #[test]
    fn test_date_analytics_skips_opaque_entries() {
        let snap = snapshot(vec![(
            "Ana",
            entry(&["10.06.2024", "31.2", "17.06.2024"], &["01.07.2024"], 0, 0),
        )]);
        let d = date_analytics(&snap);
        assert_eq!(d.total_dated, 3);
        assert_eq!(d.first, NaiveDate::from_ymd_opt(2024, 6, 10));
        assert_eq!(d.last, NaiveDate::from_ymd_opt(2024, 7, 1));
        assert_eq!(d.monthly["2024-06"], 2);
        assert_eq!(d.busiest_month, Some(("2024-06".to_string(), 2)));
    }

    #[test]
    fn test_date_analytics_weekdays() {
        // 2024-06-10 is a Monday.
        let snap = snapshot(vec![(
            "Ana",
            entry(&["10.06.2024", "17.06.2024"], &[], 0, 0),
        )]);
        let d = date_analytics(&snap);
        assert_eq!(d.weekdays[0], (Weekday::Mon, 2));
        assert_eq!(d.busiest_weekday, Some((Weekday::Mon, 2)));
    }

    #[test]
    fn test_empty_snapshot_analytics() {
        let d = date_analytics(&snapshot(vec![]));
        assert_eq!(d.total_dated, 0);
        assert!(d.first.is_none());
        assert!(d.busiest_weekday.is_none());
    }

    #[test]
    fn test_patterns_buckets() {
        let snap = snapshot(vec![
            ("Ana", entry(&["10.01.2024"], &[], 0, 2)), // 3 current, only paid
            ("Dan", entry(&[], &["12.01.2024"], 0, 0)), // only unpaid
            ("Eva", entry(&[], &[], 0, 0)),             // none
        ]);
        let p = patterns(&snap);
        assert_eq!(p.session_ranges[0], ("0 sessions", 1));
        assert_eq!(p.session_ranges[1], ("1-5 sessions", 2));
        assert_eq!(p.payment_patterns[0], ("Only paid", 1));
        assert_eq!(p.payment_patterns[1], ("Only unpaid", 1));
        assert_eq!(p.payment_patterns[3], ("No sessions", 1));
        assert_eq!(p.remaining_ranges[1], ("1-5 remaining", 1));
    }
}
