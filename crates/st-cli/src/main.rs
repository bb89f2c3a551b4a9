use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use st_cli::commands::analyze::AnalyzeOptions;
use st_cli::commands::{analyze, collect, events, export, report, sessions};
use st_cli::{Cli, Commands, Config, SourceArgs, source};
use st_core::{Analysis, Analyzer, DayBoundary, Profile};

fn load_config(config_path: Option<&Path>) -> Result<(Config, DayBoundary)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    let boundary = config
        .day_boundary()
        .context("invalid cutoff_hour in configuration")?;
    Ok((config, boundary))
}

/// Acquire records for the selected profile and run the pipeline.
fn load_analysis(
    config: &Config,
    boundary: DayBoundary,
    args: &SourceArgs,
) -> Result<(Profile, Analysis)> {
    let profile = args.profile.unwrap_or(config.profile);
    let days = args.days.unwrap_or(config.days);

    let records = source::load_records(args.input.as_deref(), profile, days, &boundary)?;
    let analyzer = Analyzer::for_profile(profile, &config.suppress, boundary);
    let analysis = st_core::analyze(&records, &analyzer);
    tracing::debug!(
        %profile,
        records = records.len(),
        events = analysis.events.len(),
        sessions = analysis.sessions.len(),
        "analysis complete"
    );
    Ok((profile, analysis))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (config, boundary) = load_config(cli.config.as_deref())?;

    match command {
        Commands::Analyze {
            source,
            output,
            stats,
            no_write,
            json,
        } => {
            let (profile, analysis) = load_analysis(&config, boundary, source)?;
            let output = output
                .clone()
                .unwrap_or_else(|| config.default_output(profile));
            let stats = stats
                .clone()
                .unwrap_or_else(|| export::stats_path_for(&output));
            let options = AnalyzeOptions {
                output,
                stats,
                write: !*no_write,
                json: *json,
            };
            analyze::run(
                &analysis,
                profile,
                boundary.cutoff_hour(),
                &options,
                Utc::now(),
            )?;
        }
        Commands::Events { source, limit } => {
            let (_profile, analysis) = load_analysis(&config, boundary, source)?;
            events::run(&analysis, &boundary, *limit)?;
        }
        Commands::Sessions { source, json } => {
            let (_profile, analysis) = load_analysis(&config, boundary, source)?;
            sessions::run(&analysis, *json)?;
        }
        Commands::Report { source, bins } => {
            let (profile, analysis) = load_analysis(&config, boundary, source)?;
            report::run(&analysis, profile, bins.unwrap_or(config.histogram_bins))?;
        }
        Commands::Collect {
            profile,
            days,
            output,
        } => {
            let profile = profile.unwrap_or(config.profile);
            let days = days.unwrap_or(config.days);
            let output = output
                .clone()
                .unwrap_or_else(|| config.default_collect_output(profile));
            collect::run(profile, days, &boundary, &output)?;
        }
    }

    Ok(())
}
