//! Rules command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sg_advisor::Registry;
use sg_core::Engine;

use crate::cli::{GlobalArgs, OutputFormat, RulesArgs};
use crate::commands::common::print_table;

#[derive(Serialize)]
struct RuleEntry {
    engine: Engine,
    rule: &'static str,
}

/// Execute the rules command.
pub(crate) async fn execute(args: &RulesArgs, _global: &GlobalArgs) -> Result<()> {
    let engine: Option<Engine> = args.engine.as_deref().map(str::parse).transpose()?;
    let registry = Registry::with_defaults().context("Failed to build rule registry")?;

    let entries: Vec<RuleEntry> = registry
        .entries()
        .filter(|(e, _)| engine.map_or(true, |wanted| *e == wanted))
        .map(|(engine, kind)| RuleEntry {
            engine,
            rule: kind.as_str(),
        })
        .collect();

    match args.output {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&entries).context("Failed to serialize to JSON")?;
            println!("{json}");
        }
        OutputFormat::Text => {
            let rows: Vec<Vec<String>> = entries
                .iter()
                .map(|e| vec![e.engine.to_string(), e.rule.to_string()])
                .collect();
            print_table(&["ENGINE", "RULE"], &rows);
            println!();
            println!("{} rule(s)", entries.len());
        }
    }
    Ok(())
}
