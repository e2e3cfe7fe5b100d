use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::{bar, session_date};
use crate::settings::load_settings;
use crate::stats;

const BAR_WIDTH: usize = 20;

// ---------------------------------------------------------------------------
// Data-fetching wrappers (used by dispatch)
// ---------------------------------------------------------------------------

pub fn overview(file: &str) -> Result<()> {
    let snapshot = stats::load_snapshot(Path::new(file))?;
    let data = stats::overview(&snapshot, load_settings().session_price);
    println!("{}", format_overview(&data, &snapshot.updated));
    Ok(())
}

pub fn rankings(file: &str, limit: usize) -> Result<()> {
    let snapshot = stats::load_snapshot(Path::new(file))?;
    let data = stats::rankings(&snapshot, limit);
    println!("{}", format_rankings(&data));
    Ok(())
}

pub fn dates(file: &str) -> Result<()> {
    let snapshot = stats::load_snapshot(Path::new(file))?;
    let data = stats::date_analytics(&snapshot);
    println!("{}", format_dates(&data));
    Ok(())
}

pub fn patterns(file: &str) -> Result<()> {
    let snapshot = stats::load_snapshot(Path::new(file))?;
    let data = stats::patterns(&snapshot);
    println!("{}", format_patterns(&data, snapshot.clients.len()));
    Ok(())
}

// ---------------------------------------------------------------------------
// Pure formatting functions (report data → String)
// ---------------------------------------------------------------------------

pub fn format_overview(o: &stats::Overview, updated: &str) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value", "Details"]);

    table.add_row(vec![
        Cell::new("Total clients"),
        Cell::new(o.total_clients),
        Cell::new("all extracted clients"),
    ]);
    table.add_row(vec![
        Cell::new("Active clients"),
        Cell::new(o.active_clients),
        Cell::new("with current sessions"),
    ]);
    table.add_row(vec![
        Cell::new("With history"),
        Cell::new(o.clients_with_previous),
        Cell::new("previous sessions on record"),
    ]);
    table.add_row(vec![
        Cell::new("With unpaid"),
        Cell::new(o.clients_with_unpaid),
        Cell::new("owing payment"),
    ]);
    table.add_row(vec![
        Cell::new("With notes"),
        Cell::new(o.clients_with_notes),
        Cell::new("annotated sessions"),
    ]);

    table.add_row(vec![Cell::new(""), Cell::new(""), Cell::new("")]);
    table.add_row(vec![
        Cell::new("Current sessions"),
        Cell::new(o.total_current),
        Cell::new("this tracking period"),
    ]);
    table.add_row(vec![
        Cell::new("All-time sessions"),
        Cell::new(o.total_all_time),
        Cell::new("including previous"),
    ]);
    table.add_row(vec![
        Cell::new("Paid & used"),
        Cell::new(o.total_paid_used),
        Cell::new("completed paid sessions"),
    ]);
    table.add_row(vec![
        Cell::new("Pre-paid remaining"),
        Cell::new(o.total_remaining),
        Cell::new("purchased, not yet dated"),
    ]);
    table.add_row(vec![
        Cell::new("Unpaid"),
        Cell::new(o.total_unpaid),
        Cell::new("taken but not paid"),
    ]);

    table.add_row(vec![Cell::new(""), Cell::new(""), Cell::new("")]);
    let price = format!("@ {} / session", o.session_price);
    table.add_row(vec![
        Cell::new("Revenue (paid)"),
        Cell::new(o.revenue_paid),
        Cell::new(&price),
    ]);
    table.add_row(vec![
        Cell::new("Potential revenue"),
        Cell::new(o.revenue_remaining),
        Cell::new("from remaining sessions"),
    ]);
    table.add_row(vec![
        Cell::new("Outstanding"),
        Cell::new(o.outstanding_unpaid),
        Cell::new("from unpaid sessions"),
    ]);

    format!(
        "{} (snapshot updated {})\n{table}",
        "Session Overview".bold(),
        updated
    )
}

fn ranking_table(title: &str, rows: &[(String, u32)]) -> Option<String> {
    if rows.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec!["#", "Client", "Sessions"]);
    for (i, (name, count)) in rows.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(name),
            Cell::new(count),
        ]);
    }
    Some(format!("{}\n{table}", title.bold()))
}

pub fn format_rankings(r: &stats::Rankings) -> String {
    let sections = [
        ranking_table("Top all-time", &r.top_all_time),
        ranking_table("Most active (current)", &r.top_current),
        ranking_table("Largest history", &r.top_previous),
        ranking_table("Highest unpaid", &r.top_unpaid),
    ];
    let rendered: Vec<String> = sections.into_iter().flatten().collect();
    if rendered.is_empty() {
        "No clients in snapshot.".to_string()
    } else {
        rendered.join("\n\n")
    }
}

pub fn format_dates(d: &stats::DateAnalytics) -> String {
    if d.total_dated == 0 {
        return "No dated sessions found for analysis.".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!("{}\n", "Date Analytics".bold()));
    out.push_str(&format!("  Dated sessions : {}\n", d.total_dated));
    if let (Some(first), Some(last)) = (d.first, d.last) {
        out.push_str(&format!(
            "  Date range     : {} to {}\n",
            session_date(first),
            session_date(last)
        ));
    }
    if let Some((month, count)) = &d.busiest_month {
        out.push_str(&format!("  Busiest month  : {month} ({count} sessions)\n"));
    }
    if let Some((weekday, count)) = &d.busiest_weekday {
        out.push_str(&format!("  Busiest day    : {weekday} ({count} sessions)\n"));
    }

    let max_monthly = d.monthly.values().copied().max().unwrap_or(1);
    let mut monthly = Table::new();
    monthly.set_header(vec!["Month", "Sessions", ""]);
    // Last twelve months with activity.
    let months: Vec<_> = d.monthly.iter().collect();
    let skip = months.len().saturating_sub(12);
    for (month, count) in months.into_iter().skip(skip) {
        monthly.add_row(vec![
            Cell::new(month),
            Cell::new(count),
            Cell::new(bar(*count, max_monthly, BAR_WIDTH)),
        ]);
    }
    out.push_str(&format!("\n{monthly}\n"));

    let max_daily = d.weekdays.iter().map(|(_, n)| *n).max().unwrap_or(1);
    let mut daily = Table::new();
    daily.set_header(vec!["Day", "Sessions", ""]);
    for (weekday, count) in &d.weekdays {
        daily.add_row(vec![
            Cell::new(weekday),
            Cell::new(count),
            Cell::new(bar(*count, max_daily, BAR_WIDTH)),
        ]);
    }
    out.push_str(&format!("\n{daily}"));
    out
}

fn distribution_table(title: &str, rows: &[(&'static str, u64)], total: usize) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Range", "Clients", "Share"]);
    for (label, count) in rows {
        let pct = if total > 0 {
            *count as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        table.add_row(vec![
            Cell::new(label),
            Cell::new(count),
            Cell::new(format!("{pct:.1}%")),
        ]);
    }
    format!("{}\n{table}", title.bold())
}

pub fn format_patterns(p: &stats::Patterns, total_clients: usize) -> String {
    [
        distribution_table("Session count distribution", &p.session_ranges, total_clients),
        distribution_table("Payment patterns", &p.payment_patterns, total_clients),
        distribution_table("Remaining sessions", &p.remaining_ranges, total_clients),
    ]
    .join("\n\n")
}
