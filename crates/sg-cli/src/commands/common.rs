//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use sg_core::{Advice, AdviceStatus};
use std::fmt;

use crate::cli::{OutputFormat, SqlInput};

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main exits with the code and prints nothing.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// The SQL named by `--sql` or `--file`.
pub(crate) fn read_sql(input: &SqlInput) -> Result<String> {
    match (&input.sql, &input.file) {
        (Some(sql), _) => Ok(sql.clone()),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        (None, None) => anyhow::bail!("Either --sql or --file is required"),
    }
}

/// Calculate column widths for table output
fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }
    widths
}

/// Print a simple aligned table.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  ").trim_end());

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  ").trim_end());
    }
}

/// Error and warning counts of `advices`.
pub(crate) fn count_findings(advices: &[Advice]) -> (usize, usize) {
    let errors = advices
        .iter()
        .filter(|a| a.status == AdviceStatus::Error)
        .count();
    let warnings = advices
        .iter()
        .filter(|a| a.status == AdviceStatus::Warn)
        .count();
    (errors, warnings)
}

/// Print review advice as a table with a summary line, or as JSON.
pub(crate) fn print_advices(advices: &[Advice], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(advices).context("Failed to serialize to JSON")?;
            println!("{json}");
        }
        OutputFormat::Text => {
            let rows: Vec<Vec<String>> = advices
                .iter()
                .map(|a| {
                    vec![
                        a.status.to_string(),
                        a.code.as_i32().to_string(),
                        a.title.clone(),
                        a.content.clone(),
                    ]
                })
                .collect();
            print_table(&["STATUS", "CODE", "TITLE", "CONTENT"], &rows);

            let (errors, warnings) = count_findings(advices);
            println!();
            println!("{errors} error(s), {warnings} warning(s)");
        }
    }
    Ok(())
}
