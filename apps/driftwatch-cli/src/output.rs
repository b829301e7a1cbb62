//! Comparison output: colored console table, CSV file, ASCII-table file.
//!
//! This layer owns the user-facing vocabulary. The engine's side-neutral
//! statuses become `OK!` / `Missing in Huntress` / `Missing in Syncro`,
//! and the columns get the service names as headers.

use crate::error::CliResult;
use driftwatch_core::prelude::{ComparisonResult, ComparisonRow, MatchStatus};
use std::io::Write;
use std::path::Path;

/// Column headers, in row order: Syncro name, Huntress name, status.
pub const HEADERS: [&str; 3] = ["Syncro Asset", "Huntress Asset", "Status"];

pub const STATUS_OK: &str = "OK!";
pub const STATUS_MISSING_IN_HUNTRESS: &str = "Missing in Huntress";
pub const STATUS_MISSING_IN_SYNCRO: &str = "Missing in Syncro";

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// User-facing label for a match status. Syncro is the left side.
pub fn status_label(status: MatchStatus) -> &'static str {
    match status {
        MatchStatus::Matched => STATUS_OK,
        MatchStatus::MissingOnRight => STATUS_MISSING_IN_HUNTRESS,
        MatchStatus::MissingOnLeft => STATUS_MISSING_IN_SYNCRO,
    }
}

fn display_cells(row: &ComparisonRow) -> [&str; 3] {
    [&row.left, &row.right, status_label(row.status)]
}

/// Width of each column, sized to the widest cell including the header.
/// Counts characters, not bytes, so multi-byte names line up.
fn column_widths(rows: &[ComparisonRow]) -> [usize; 3] {
    let mut widths = [
        HEADERS[0].chars().count(),
        HEADERS[1].chars().count(),
        HEADERS[2].chars().count(),
    ];
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(display_cells(row)) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{cell}{}", " ".repeat(width.saturating_sub(len)))
}

/// A border line like `+-----+-----+-----+`.
fn border(widths: &[usize; 3], fill: char) -> String {
    let segments: Vec<String> = widths
        .iter()
        .map(|w| fill.to_string().repeat(w + 2))
        .collect();
    format!("+{}+", segments.join("+"))
}

/// Print the comparison to stdout, one row per device, matched rows in
/// green and mismatches in red. `NO_COLOR` wins over `use_color`.
pub fn print_table(result: &ComparisonResult, use_color: bool) {
    let use_color = use_color && std::env::var("NO_COLOR").is_err();
    let widths = column_widths(&result.rows);

    let header: Vec<String> = HEADERS
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad(h, *w))
        .collect();
    println!("{}", header.join("  "));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 4));

    for row in &result.rows {
        let (color, reset) = if use_color {
            let color = if row.status == MatchStatus::Matched {
                GREEN
            } else {
                RED
            };
            (color, RESET)
        } else {
            ("", "")
        };
        let [left, right, status] = display_cells(row);
        println!(
            "{}  {}  {color}{}{reset}",
            pad(left, widths[0]),
            pad(right, widths[1]),
            pad(status, widths[2]),
        );
    }

    println!();
    println!(
        "Syncro devices: {}  Huntress devices: {}",
        result.left_count, result.right_count
    );
}

/// Write the comparison as CSV.
pub fn write_csv(path: &Path, result: &ComparisonResult) -> CliResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(HEADERS)?;
    for row in &result.rows {
        writer.write_record(display_cells(row))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the comparison as a plain-text table with `+---+` borders and a
/// `=` rule under the header.
pub fn write_ascii_table(path: &Path, result: &ComparisonResult) -> CliResult<()> {
    let widths = column_widths(&result.rows);
    let mut file = std::fs::File::create(path)?;

    let format_row = |cells: [&str; 3]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad(cell, *w))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    writeln!(file, "{}", border(&widths, '-'))?;
    writeln!(file, "{}", format_row(HEADERS))?;
    writeln!(file, "{}", border(&widths, '='))?;
    for row in &result.rows {
        writeln!(file, "{}", format_row(display_cells(row)))?;
    }
    writeln!(file, "{}", border(&widths, '-'))?;
    Ok(())
}
