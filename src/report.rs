//! Tabular and JSON rendering of profile results.
//!
//! The table layout is transposed: one row per statistic, one column per
//! feature, in the canonical field-enumeration order, so every record of a
//! profile lines up regardless of which fields it carries.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use itertools::Itertools;

use crate::analyzer::ProfileResult;
use crate::profile::DatasetProfile;
use crate::stats::FIELD_ORDER;

/// Build the transposed metric table for one profile: headers then rows.
pub fn metric_table(profile: &DatasetProfile) -> (Vec<String>, Vec<Vec<String>>) {
    let features = profile.all_features();
    let mut headers = vec!["metric".to_string()];
    headers.extend(features.keys().map(|name| (*name).to_string()));

    let columns: Vec<Vec<(&str, Option<String>)>> =
        features.values().map(|stats| stats.fields()).collect();

    let rows = FIELD_ORDER
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let mut row = vec![(*name).to_string()];
            row.extend(columns.iter().map(|fields| {
                fields[idx].1.clone().unwrap_or_default()
            }));
            row
        })
        .collect();
    (headers, rows)
}

pub fn render_profile(profile: &DatasetProfile) -> String {
    let (headers, rows) = metric_table(profile);
    render_table(&headers, &rows)
}

pub fn print_result(result: &ProfileResult) {
    println!("Reference profile");
    print!("{}", render_profile(&result.reference));
    if let Some(current) = &result.current {
        println!();
        println!("Current profile");
        print!("{}", render_profile(current));
    }
}

pub fn result_to_json(result: &ProfileResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("Serializing profile result to JSON")
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    for width in &mut widths {
        *width = (*width).max(1);
    }

    let mut output = String::new();

    let header_line = format_row(headers, &widths);
    let _ = writeln!(output, "{header_line}");

    let separator_cells = widths.iter().map(|w| "-".repeat((*w).max(3))).collect::<Vec<_>>();
    let separator_widths = widths.iter().map(|w| (*w).max(3)).collect::<Vec<_>>();
    let separator_line = format_row(&separator_cells, &separator_widths);
    let _ = writeln!(output, "{separator_line}");

    for row in rows {
        let row_line = format_row(row, &widths);
        let _ = writeln!(output, "{row_line}");
    }

    output
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let sanitized: String = value
                .chars()
                .map(|ch| if matches!(ch, '\n' | '\r' | '\t') { ' ' } else { ch })
                .collect();
            let padding = width.saturating_sub(sanitized.chars().count());
            format!("{sanitized}{}", " ".repeat(padding))
        })
        .join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}
