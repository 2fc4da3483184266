//! Check command implementation

use anyhow::{Context, Result};
use sg_advisor::{summarize, worst_status, AdvisorContext, PolicyChecker, Registry};
use sg_core::{
    Advice, AdviceStatus, Catalog, Engine, Namespace, Policy, PolicyRule, RuleKind, RuleLevel,
};

use crate::cli::{CheckArgs, GlobalArgs, LevelArg};
use crate::commands::common::{print_advices, read_sql, ExitCode};
use crate::context::RuntimeContext;

/// Execute the check command.
pub(crate) async fn execute(args: &CheckArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::load(global)?;
    let sql = read_sql(&args.input)?;
    let namespace = ctx.namespace(None)?;
    let catalog = ctx.catalog(&namespace).await?;

    let single;
    let policy = match &args.rule {
        Some(rule) => {
            single = single_rule_policy(rule, args.level, args.payload.as_deref())?;
            Some(&single)
        }
        None => ctx.config.policy.as_ref(),
    };

    let advices = review(&ctx, ctx.config.engine, policy, &catalog, namespace, &sql)?;
    let shown = if args.all { advices } else { summarize(advices) };
    print_advices(&shown, args.output)?;

    if worst_status(&shown) == AdviceStatus::Error {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

/// Run `policy` over `sql` with the configured plan, charset and collation.
pub(crate) fn review(
    ctx: &RuntimeContext,
    engine: Engine,
    policy: Option<&Policy>,
    catalog: &dyn Catalog,
    namespace: Namespace,
    sql: &str,
) -> Result<Vec<Advice>> {
    let registry = Registry::with_defaults().context("Failed to build rule registry")?;
    let advisor_ctx = AdvisorContext::new(namespace, catalog)
        .with_charset(ctx.config.charset.clone())
        .with_collation(ctx.config.collation.clone());
    PolicyChecker::new(&registry, ctx.config.plan)
        .check(engine, policy, &advisor_ctx, sql)
        .context("Review failed")
}

/// A one-rule policy for `--rule`.
fn single_rule_policy(rule: &str, level: LevelArg, payload: Option<&str>) -> Result<Policy> {
    let kind: RuleKind = rule.parse()?;
    let level = match level {
        LevelArg::Error => RuleLevel::Error,
        LevelArg::Warning => RuleLevel::Warning,
    };
    let mut rule = PolicyRule::new(kind, level);
    if let Some(payload) = payload {
        let payload: serde_json::Value =
            serde_json::from_str(payload).context("--payload is not valid JSON")?;
        rule = rule.with_payload(payload);
    }
    let policy = Policy::new(vec![rule]);
    policy.validate()?;
    Ok(policy)
}
