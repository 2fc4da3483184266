//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// schemagate - SQL review and tracked schema migrations
#[derive(Parser, Debug)]
#[command(name = "sg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

/// Log output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Review SQL against the configured policy or a single rule
    Check(CheckArgs),

    /// Review, record, and apply a migration
    Migrate(MigrateArgs),

    /// Show the migration history
    History(HistoryArgs),

    /// List the rules available per engine
    Rules(RulesArgs),
}

/// SQL given inline or read from a file
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SqlInput {
    /// SQL text
    #[arg(long)]
    pub sql: Option<String>,

    /// File containing the SQL
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table
    Text,
    /// JSON output
    Json,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: SqlInput,

    /// Run only this rule, e.g. `statement.where.require`
    #[arg(short, long)]
    pub rule: Option<String>,

    /// Level for --rule
    #[arg(long, value_enum, default_value = "error", requires = "rule")]
    pub level: LevelArg,

    /// JSON payload for --rule
    #[arg(long, requires = "rule")]
    pub payload: Option<String>,

    /// Show every advice instead of only the findings
    #[arg(short, long)]
    pub all: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Rule level accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelArg {
    Error,
    Warning,
}

/// Migration kind accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Migrate,
    Baseline,
    Branch,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub input: SqlInput,

    /// Target namespace (default: database.name)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Migration version, semantic (1.2.0) or free-form (20240101120000)
    #[arg(long = "version")]
    pub migration_version: String,

    /// Migration kind
    #[arg(short, long, value_enum, default_value = "migrate")]
    pub kind: KindArg,

    /// Description stored with the history record
    #[arg(short, long)]
    pub description: Option<String>,

    /// Creator stored with the history record
    #[arg(long)]
    pub creator: Option<String>,

    /// Apply without reviewing the SQL first
    #[arg(long)]
    pub skip_check: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Filter by namespace
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Filter by version
    #[arg(long = "version")]
    pub migration_version: Option<String>,

    /// Maximum number of records
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the rules command
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Only list rules for this engine
    #[arg(short, long)]
    pub engine: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
