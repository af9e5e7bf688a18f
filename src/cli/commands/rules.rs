//! `vsm rules` command - inspect and validate rule books

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::utils::{load_rules, rules_report};
use crate::cli::output::effective_format;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::rules::RuleBook;
use crate::core::waste::{ScoringModel, ScoringRule, WasteCategory};

#[derive(Subcommand, Debug)]
pub enum RulesCommands {
    /// Print the effective rule book (from --rules, config, or the built-in default)
    Show,

    /// Check a rule book file without running an analysis
    Validate {
        /// Rule book YAML file
        file: PathBuf,
    },
}

pub fn run(cmd: RulesCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        RulesCommands::Show => run_show(global),
        RulesCommands::Validate { file } => run_validate(file),
    }
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let rules = load_rules(global, &config)?;

    match effective_format(global.output, false) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rules).into_diagnostic()?;
            println!("{}", json);
        }
        _ => {
            let yaml = serde_yml::to_string(&rules).into_diagnostic()?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

fn run_validate(file: PathBuf) -> Result<()> {
    let rules = RuleBook::load(&file).map_err(rules_report)?;
    let model = ScoringModel::from_rules(&rules).map_err(rules_report)?;

    println!("{} {}", style("✓").green(), file.display());
    for waste in WasteCategory::ALL {
        let how = match model.rule(waste) {
            Some(ScoringRule::Evidence { questions, .. }) => {
                format!("{} question(s)", questions.len())
            }
            Some(ScoringRule::Ratio { metric, .. }) => format!("ratio of {}", metric),
            Some(ScoringRule::Fixed { score, .. }) => format!("fixed score {}", score),
            None => "no rule".to_string(),
        };
        let templates = rules
            .waste_templates
            .get(&waste)
            .map(|t| t.high.len() + t.medium.len())
            .unwrap_or(0);
        println!(
            "  {:<16} {:<24} {} template(s)",
            style(waste.as_str()).cyan(),
            how,
            templates
        );
    }
    Ok(())
}
