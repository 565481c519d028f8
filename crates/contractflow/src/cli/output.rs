//! Output formatting utilities for CLI commands

use chrono::{DateTime, Utc};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use contractflow_store::ContractStatus;
use serde::Serialize;

/// Format a timestamp as "3 hours ago", or as a date once older than a week.
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 0 {
        return "just now".to_string();
    }

    let plural = |n: i64, unit: &str| format!("{} {}{} ago", n, unit, if n == 1 { "" } else { "s" });
    if secs < 60 {
        plural(secs, "second")
    } else if secs < 3600 {
        plural(secs / 60, "minute")
    } else if secs < 86400 {
        plural(secs / 3600, "hour")
    } else if secs < 604800 {
        plural(secs / 86400, "day")
    } else {
        format_timestamp(then)
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

pub fn status_color(status: ContractStatus) -> Color {
    match status {
        ContractStatus::Draft => Color::Grey,
        ContractStatus::Created => Color::White,
        ContractStatus::Approved => Color::Blue,
        ContractStatus::Sent => Color::Yellow,
        ContractStatus::Signed => Color::Green,
        ContractStatus::Locked => Color::Cyan,
        ContractStatus::Revoked => Color::Red,
    }
}

pub fn status_cell(status: ContractStatus) -> Cell {
    Cell::new(status.label()).fg(status_color(status))
}

/// Build a table with cyan headers.
pub fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
