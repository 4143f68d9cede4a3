//! linegroup - groups delimited records that share column values
//!
//! Reads a plain or gzip-compressed file of semicolon-delimited, quoted-field
//! lines, keeps each valid line once, and groups lines that carry the same
//! non-empty value at the same column. Groups are reported largest first.
//!
//! The pipeline is:
//!
//! 1. [`input`]: read, validate and deduplicate lines
//! 2. [`grouping`]: assign every record to exactly one group
//! 3. [`output`]: rank groups and render the report

pub mod cli;
pub mod config;
pub mod error;
pub mod grouping;
pub mod input;
pub mod logging;
pub mod output;
pub mod progress;
pub mod record;
pub mod signal;

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use yansi::Paint;

use crate::cli::{CheckArgs, Cli, Commands, GroupArgs};
use crate::config::Config;
use crate::error::ExitCode;
use crate::grouping::GroupingConfig;
use crate::input::{LoadStats, LoaderConfig, RecordLoader, RecordSet};
use crate::output::{open_output, write_report, Report, RunSummary};
use crate::progress::{Progress, ProgressCallback};
use crate::signal::ShutdownHandler;

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error if configuration, loading or writing the report fails.
/// An interrupt during loading surfaces as [`input::InputError::Interrupted`].
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color || !std::io::stderr().is_terminal() {
        yansi::disable();
    }

    let shutdown = signal::install_handler();

    match &cli.command {
        Commands::Group(args) => run_group(&cli, args, &shutdown),
        Commands::Check(args) => run_check(&cli, args, &shutdown),
    }
}

fn run_group(
    cli: &Cli,
    args: &GroupArgs,
    shutdown: &ShutdownHandler,
) -> anyhow::Result<ExitCode> {
    let start = Instant::now();
    let config = Config::load(cli.config.as_deref(), &args.overrides())
        .context("Failed to load configuration")?;
    log::debug!("Effective configuration: {:?}", config);

    let progress = progress_for(cli, &config);
    let (records, load_stats) = load_records(&config, shutdown, progress.clone())?;
    log::info!("Number of prepared lines: {}", records.len());

    if shutdown.is_shutdown_requested() {
        return Ok(ExitCode::Interrupted);
    }

    let mut grouping_config = GroupingConfig::default()
        .with_format(config.record.clone())
        .with_strategy(config.strategy)
        .with_order(config.order);
    if let Some(callback) = progress {
        grouping_config = grouping_config.with_progress_callback(callback);
    }
    let (groups, grouping_stats) = grouping::group(records, &grouping_config);

    if shutdown.is_shutdown_requested() {
        return Ok(ExitCode::Interrupted);
    }

    let report = Report::new(&groups, config.min_group_size);
    let mut summary =
        RunSummary::new(&config.input, config.strategy, &load_stats, &grouping_stats);
    summary.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let writer = open_output(&args.output).context("Failed to open report output")?;
    let emitted = write_report(&report, config.format, &summary, writer)
        .with_context(|| format!("Failed to write report to {}", args.output.display()))?;

    log::info!(
        "Groups with more than one element: {}.",
        grouping_stats.multi_member_groups
    );
    log::info!("Execution time: {:.2}s.", start.elapsed().as_secs_f64());

    if !cli.quiet {
        eprintln!(
            "{} {} groups written ({} records, largest group {})",
            "Done:".green().bold(),
            emitted.bold(),
            load_stats.unique_records,
            grouping_stats.largest_group
        );
    }

    if emitted == 0 {
        Ok(ExitCode::NoGroups)
    } else {
        Ok(ExitCode::Success)
    }
}

fn run_check(
    cli: &Cli,
    args: &CheckArgs,
    shutdown: &ShutdownHandler,
) -> anyhow::Result<ExitCode> {
    let start = Instant::now();
    let config = Config::load(cli.config.as_deref(), &args.overrides())
        .context("Failed to load configuration")?;

    let progress = progress_for(cli, &config);
    let (_, stats) = load_records(&config, shutdown, progress)?;

    println!("{} {}", "Input:".bold(), config.input.display());
    println!("  lines read:      {}", stats.lines_read);
    println!("  valid lines:     {}", stats.valid_lines);
    println!(
        "  invalid lines:   {} ({} not UTF-8)",
        stats.invalid_lines,
        stats.non_utf8_lines
    );
    println!("  duplicate lines: {}", stats.duplicate_lines);
    println!(
        "  unique records:  {}",
        stats.unique_records.to_string().green()
    );
    println!("  rejected:        {:.2}%", stats.rejection_rate());
    log::info!("Execution time: {:.2}s.", start.elapsed().as_secs_f64());

    Ok(ExitCode::Success)
}

fn progress_for(cli: &Cli, config: &Config) -> Option<Arc<dyn ProgressCallback>> {
    if cli.quiet || !config.progress || !std::io::stderr().is_terminal() {
        return None;
    }
    Some(Arc::new(Progress::new(false)))
}

fn load_records(
    config: &Config,
    shutdown: &ShutdownHandler,
    progress: Option<Arc<dyn ProgressCallback>>,
) -> anyhow::Result<(RecordSet, LoadStats)> {
    let mut loader_config = LoaderConfig::default()
        .with_format(config.record.clone())
        .with_batch_size(config.batch_size)
        .with_max_records(config.max_records)
        .with_shutdown_flag(shutdown.get_flag());
    if let Some(callback) = progress {
        loader_config = loader_config.with_progress_callback(callback);
    }

    let loader = RecordLoader::new(loader_config).context("Invalid record format")?;
    let (records, stats) = loader
        .load_path(&config.input)
        .with_context(|| format!("Failed to load records from {}", config.input.display()))?;

    if stats.invalid_lines > 0 {
        log::warn!(
            "Skipped {} malformed lines ({:.2}% of input)",
            stats.invalid_lines,
            stats.rejection_rate()
        );
    }
    Ok((records, stats))
}
