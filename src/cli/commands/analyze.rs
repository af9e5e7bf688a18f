//! `vsm analyze` command - full pipeline with ranked observations

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::commands::utils::{analysis_report, load_rules, read_steps, shift_seconds};
use crate::cli::filters::{ConfidenceFilter, WasteFilter};
use crate::cli::helpers::format_duration;
use crate::cli::output::effective_format;
use crate::cli::table::{observation_table, timing_table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::analysis::{analyze, AnalysisOptions, TopWastes};
use crate::core::config::Config;
use crate::core::lead_time::LeadTime;
use crate::core::observation::ObservationRow;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Step file (.yaml, .yml or .csv), in process order
    pub steps: PathBuf,

    /// Available time per shift in hours (default from config, else 8)
    #[arg(long)]
    pub available_hours: Option<f64>,

    /// Wastes to keep per step in the top-wastes summary
    #[arg(long)]
    pub top: Option<usize>,

    /// Only show observations for this waste
    #[arg(long, short = 'w')]
    pub waste: Option<WasteFilter>,

    /// Minimum confidence to show
    #[arg(long, default_value = "all")]
    pub min_confidence: ConfidenceFilter,

    /// Show at most this many observations
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Include the per-step timing table
    #[arg(long)]
    pub timing: bool,
}

/// Serialized shape of an analysis for JSON/YAML output
#[derive(Debug, Serialize)]
struct AnalysisReport<'a> {
    lead_time: LeadTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    bottleneck_step: Option<&'a str>,
    observations: Vec<&'a ObservationRow>,
    top_wastes: &'a [TopWastes],
}

pub fn run(args: AnalyzeArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let rules = load_rules(global, &config)?;
    let steps = read_steps(&args.steps)?;
    let options = AnalysisOptions {
        available_time_sec: shift_seconds(args.available_hours, &config)?,
        top_wastes: args.top.unwrap_or_else(|| config.top_wastes()),
    };

    let analysis = analyze(&steps, &rules, options).map_err(analysis_report)?;

    let observations: Vec<&ObservationRow> = analysis
        .observations
        .iter()
        .filter(|o| args.waste.map_or(true, |w| w.matches(o.waste)))
        .filter(|o| args.min_confidence.matches(o.confidence))
        .take(args.limit.unwrap_or(usize::MAX))
        .collect();

    match effective_format(global.output, true) {
        OutputFormat::Json | OutputFormat::Yaml => {
            let report = AnalysisReport {
                lead_time: analysis.lead_time.rounded(),
                bottleneck_step: analysis.lead_time.bottleneck_step(),
                observations,
                top_wastes: &analysis.top_wastes,
            };
            if global.output == OutputFormat::Json {
                let json = serde_json::to_string_pretty(&report).into_diagnostic()?;
                println!("{}", json);
            } else {
                let yaml = serde_yml::to_string(&report).into_diagnostic()?;
                print!("{}", yaml);
            }
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for row in &observations {
                wtr.serialize(row).into_diagnostic()?;
            }
            wtr.flush().into_diagnostic()?;
        }
        format => {
            let markdown = format == OutputFormat::Md;
            let lt = &analysis.lead_time;

            println!(
                "{} {} ({:.2} s)",
                style("Lead time:").bold(),
                style(format_duration(lt.lead_time_sec)).cyan(),
                lt.lead_time_sec
            );
            if let Some(id) = lt.bottleneck_step() {
                println!(
                    "{} {} ({:.2} s effective cycle time)",
                    style("Bottleneck:").bold(),
                    style(id).yellow(),
                    lt.ct_bottleneck_sec
                );
            }
            if args.timing && !lt.by_step.is_empty() {
                println!();
                println!("{}", timing_table(lt, markdown));
            }

            println!();
            if observations.is_empty() {
                println!("No observations generated.");
            } else {
                let rows: Vec<ObservationRow> = observations.into_iter().cloned().collect();
                println!("{}", observation_table(&rows, markdown));
            }

            let annotated: Vec<&TopWastes> =
                analysis.top_wastes.iter().filter(|t| !t.wastes.is_empty()).collect();
            if !annotated.is_empty() {
                println!();
                println!("{}", style("Top wastes per step").bold());
                for top in annotated {
                    let list: Vec<String> = top
                        .wastes
                        .iter()
                        .map(|(waste, score)| format!("{} {:.2}", waste, score))
                        .collect();
                    println!("  {:<8} {}", style(&top.step_id).cyan(), list.join(", "));
                }
            }
        }
    }

    Ok(())
}
