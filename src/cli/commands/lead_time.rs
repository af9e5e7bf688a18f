//! `vsm lead-time` command - per-step timing without waste scoring

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::utils::{read_steps, shift_seconds};
use crate::cli::helpers::format_duration;
use crate::cli::output::effective_format;
use crate::cli::table::timing_table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::lead_time::compute_lead_time;

#[derive(Args, Debug)]
pub struct LeadTimeArgs {
    /// Step file (.yaml, .yml or .csv), in process order
    pub steps: PathBuf,

    /// Available time per shift in hours (default from config, else 8)
    #[arg(long)]
    pub available_hours: Option<f64>,
}

pub fn run(args: LeadTimeArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let steps = read_steps(&args.steps)?;
    let available = shift_seconds(args.available_hours, &config)?;

    let lead_time = compute_lead_time(&steps, available);

    match effective_format(global.output, true) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&lead_time.rounded()).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&lead_time.rounded()).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for timing in &lead_time.rounded().by_step {
                wtr.serialize(timing).into_diagnostic()?;
            }
            wtr.flush().into_diagnostic()?;
        }
        format => {
            if lead_time.by_step.is_empty() {
                println!("No steps found.");
                return Ok(());
            }
            println!("{}", timing_table(&lead_time, format == OutputFormat::Md));
            println!(
                "{} {} ({:.2} s), bottleneck {:.2} s",
                style("Lead time:").bold(),
                style(format_duration(lead_time.lead_time_sec)).cyan(),
                lead_time.lead_time_sec,
                lead_time.ct_bottleneck_sec
            );
        }
    }

    Ok(())
}
