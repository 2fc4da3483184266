//! History command implementation

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sg_core::{MigrationHistory, MigrationHistoryFind};
use sg_db::Driver;

use crate::cli::{GlobalArgs, HistoryArgs, OutputFormat};
use crate::commands::common::print_table;
use crate::context::RuntimeContext;

/// Execute the history command.
pub(crate) async fn execute(args: &HistoryArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::load(global)?;
    let driver = ctx.open_driver()?;

    if driver.needs_setup_migration().await? {
        println!("No migration history found.");
        return Ok(());
    }

    let find = MigrationHistoryFind {
        namespace: args
            .namespace
            .as_deref()
            .map(|name| ctx.namespace(Some(name)))
            .transpose()?,
        version: args.migration_version.clone(),
        limit: Some(args.limit),
        ..Default::default()
    };
    let history = driver
        .find_migration_history_list(&find)
        .await
        .context("Failed to read migration history")?;

    match args.output {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&history).context("Failed to serialize to JSON")?;
            println!("{json}");
        }
        OutputFormat::Text if history.is_empty() => println!("No migration history found."),
        OutputFormat::Text => {
            let rows: Vec<Vec<String>> = history.iter().map(history_row).collect();
            print_table(
                &[
                    "ID",
                    "NAMESPACE",
                    "SEQ",
                    "TYPE",
                    "STATUS",
                    "VERSION",
                    "CREATED",
                    "DURATION",
                    "DESCRIPTION",
                ],
                &rows,
            );
        }
    }
    Ok(())
}

fn history_row(record: &MigrationHistory) -> Vec<String> {
    vec![
        record.id.to_string(),
        record.namespace.to_string(),
        record.sequence.to_string(),
        record.kind.to_string(),
        record.status.to_string(),
        record.version.clone(),
        format_timestamp(record.created_ts),
        format!("{}ms", record.execution_duration_ns / 1_000_000),
        record.description.clone(),
    ]
}

fn format_timestamp(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}
