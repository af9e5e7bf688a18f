//! Shared utilities for CLI commands

use miette::Report;
use std::path::Path;

use crate::cli::helpers::available_time_sec;
use crate::cli::GlobalOpts;
use crate::core::analysis::AnalysisError;
use crate::core::config::Config;
use crate::core::loader::{load_steps, InputError};
use crate::core::rules::{RuleBook, RulesError};
use crate::core::step::ProcessStep;

/// Convert a rule book error, keeping source snippets for YAML syntax errors
pub fn rules_report(err: RulesError) -> Report {
    match err {
        RulesError::Yaml(e) => Report::new(e),
        other => miette::miette!("{}", other),
    }
}

/// Convert a step input error, keeping source snippets for YAML syntax errors
pub fn input_report(err: InputError) -> Report {
    match err {
        InputError::Yaml(e) => Report::new(e),
        other => miette::miette!("{}", other),
    }
}

pub fn analysis_report(err: AnalysisError) -> Report {
    match err {
        AnalysisError::Rules(e) => rules_report(e),
        other => miette::miette!("{}", other),
    }
}

/// Resolve the rule book: `--rules`, then config, then the embedded default
pub fn load_rules(global: &GlobalOpts, config: &Config) -> miette::Result<RuleBook> {
    let path = global.rules.as_deref().or(config.rules.as_deref());
    RuleBook::load_or_embedded(path).map_err(rules_report)
}

pub fn read_steps(path: &Path) -> miette::Result<Vec<ProcessStep>> {
    load_steps(path).map_err(input_report)
}

/// Shift length in seconds from the flag or config
pub fn shift_seconds(flag: Option<f64>, config: &Config) -> miette::Result<f64> {
    let hours = flag.unwrap_or_else(|| config.available_hours());
    available_time_sec(hours).map_err(|e| miette::miette!("{}", e))
}
