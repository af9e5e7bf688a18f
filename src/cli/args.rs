//! Command-line argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    analyze::AnalyzeArgs, completions::CompletionsArgs, lead_time::LeadTimeArgs,
    rules::RulesCommands,
};

/// VSM Observation Engine - lead time, waste scores and auto-written observations
#[derive(Parser, Debug)]
#[command(name = "vsm", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "auto")]
    pub output: OutputFormat,

    /// Rule book to use instead of the configured or embedded one
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// Verbose logging (same as RUST_LOG=debug)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute lead time, score wastes and write ranked observations
    Analyze(AnalyzeArgs),

    /// Compute per-step timing and total lead time only
    LeadTime(LeadTimeArgs),

    /// Inspect or validate rule books
    #[command(subcommand)]
    Rules(RulesCommands),

    /// Print a shell completion script
    Completions(CompletionsArgs),
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Table for lists, YAML for documents
    #[default]
    Auto,
    /// Human-readable table
    Table,
    /// Markdown table
    Md,
    /// Comma-separated values
    Csv,
    /// JSON
    Json,
    /// YAML
    Yaml,
}
