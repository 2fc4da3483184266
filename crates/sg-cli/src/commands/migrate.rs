//! Migrate command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sg_advisor::{summarize, worst_status};
use sg_core::{AdviceStatus, MigrationInfo, MigrationKind, MigrationSource};
use sg_db::{Driver, MigrationExecutor};
use std::sync::Arc;

use crate::cli::{GlobalArgs, KindArg, MigrateArgs, OutputFormat};
use crate::commands::check::review;
use crate::commands::common::{count_findings, print_advices, read_sql, ExitCode};
use crate::context::RuntimeContext;

/// Applied migration, as printed with `--output json`
#[derive(Serialize)]
struct MigrateResult<'a> {
    id: i64,
    namespace: &'a str,
    sequence: i64,
    version: &'a str,
    schema: &'a str,
}

impl From<KindArg> for MigrationKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Migrate => MigrationKind::Migrate,
            KindArg::Baseline => MigrationKind::Baseline,
            KindArg::Branch => MigrationKind::Branch,
        }
    }
}

/// Execute the migrate command.
pub(crate) async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::load(global)?;
    let sql = read_sql(&args.input)?;
    let namespace = ctx.namespace(args.namespace.as_deref())?;
    let driver = ctx.open_driver()?;

    if ctx.config.engine != driver.engine() {
        anyhow::bail!(
            "Migrations run through the {} driver, but the config targets {}",
            driver.engine(),
            ctx.config.engine
        );
    }

    if args.skip_check {
        log::warn!("Skipping review of migration {}", args.migration_version);
    } else {
        let catalog = driver
            .catalog_snapshot(&namespace)
            .await
            .context("Failed to read index metadata")?;
        let advices = summarize(review(
            &ctx,
            driver.engine(),
            ctx.config.policy.as_ref(),
            &catalog,
            namespace.clone(),
            &sql,
        )?);
        if worst_status(&advices) == AdviceStatus::Error {
            print_advices(&advices, args.output)?;
            eprintln!("Migration {} blocked by review errors", args.migration_version);
            return Err(ExitCode(1).into());
        }
        let (_, warnings) = count_findings(&advices);
        if warnings > 0 && args.output == OutputFormat::Text {
            print_advices(&advices, args.output)?;
            println!();
        }
    }

    let mut info = MigrationInfo::new(namespace, &args.migration_version, args.kind.into())
        .with_source(MigrationSource::Library);
    if let Some(description) = &args.description {
        info = info.with_description(description);
    }
    if let Some(creator) = args.creator.clone().or_else(|| std::env::var("USER").ok()) {
        info = info.with_creator(creator);
    }

    let executor = MigrationExecutor::new(driver as Arc<dyn Driver>, &ctx.config.migration);
    let outcome = executor
        .execute_migration(&info, &sql)
        .await
        .with_context(|| format!("Migration {} was not applied", info.version))?;

    match args.output {
        OutputFormat::Json => {
            let result = MigrateResult {
                id: outcome.id,
                namespace: info.namespace.as_str(),
                sequence: outcome.sequence,
                version: &info.version,
                schema: &outcome.schema,
            };
            let json =
                serde_json::to_string_pretty(&result).context("Failed to serialize to JSON")?;
            println!("{json}");
        }
        OutputFormat::Text => println!(
            "Applied {} {} to {} (history {}, sequence {})",
            info.kind, info.version, info.namespace, outcome.id, outcome.sequence
        ),
    }
    Ok(())
}
