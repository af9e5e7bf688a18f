use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;
use vsm::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    // RUST_LOG wins; -v raises the default from warn to debug
    let default_level = if cli.global.verbose { "vsm=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let global = cli.global;
    match cli.command {
        Commands::Analyze(args) => vsm::cli::commands::analyze::run(args, &global),
        Commands::LeadTime(args) => vsm::cli::commands::lead_time::run(args, &global),
        Commands::Rules(cmd) => vsm::cli::commands::rules::run(cmd, &global),
        Commands::Completions(args) => vsm::cli::commands::completions::run(args),
    }
}
