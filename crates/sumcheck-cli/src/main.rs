mod commands;
mod logging;
mod progress;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, IndexArgs, VerifyArgs};
use dotenv::dotenv;
use progress::CliReporter;
use sumcheck_core::config::{load_configuration, load_configuration_from};
use sumcheck_core::engine::repair_policy;
use sumcheck_core::{AppConfig, Engine, Mismatch, RepairMode, ScanReporter, ScanStats, ScopeSelector};
use tracing::{error, info};

fn main() -> ExitCode {
    dotenv().ok();

    let args = Cli::parse();

    // Dropped when main returns, which flushes the log file.
    let _guard = logging::init_logger(logging::level_override(args.verbose, args.quiet));

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let result = match &args.command {
        Some(Commands::Verify(verify)) => run_verify(config, verify),
        Some(Commands::Index(index)) => run_index(config, index),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(true)
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(true)
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Cli) -> Result<AppConfig, sumcheck_core::Error> {
    let mut config = match &args.config {
        Some(path) => load_configuration_from(path)?,
        None => load_configuration()?,
    };
    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(database) = &args.database {
        config.database_path = database.clone();
    }
    Ok(config)
}

/// `--deferred` wins over the configured mode.
fn effective_mode(args: &VerifyArgs, configured: RepairMode) -> RepairMode {
    if args.deferred {
        RepairMode::Deferred
    } else {
        configured
    }
}

/// `Ok(false)` when at least one scope could not be verified.
fn run_verify(config: AppConfig, args: &VerifyArgs) -> anyhow::Result<bool> {
    let selector = ScopeSelector {
        paths: args.paths.clone(),
        users: args.users.clone(),
    };
    // Reject an ambiguous selection before the filecache is opened.
    let scopes = selector.resolve()?;

    let policy = repair_policy(effective_mode(args, config.repair_mode), args.repair);

    let engine = Engine::open(config).context("Cannot open filecache")?;
    let reporter = CliReporter::new();
    let outcome = engine.verify(&scopes, policy, &reporter);
    let mut stats = outcome.stats;

    let repaired = settle_pending(
        &engine,
        &outcome.pending,
        args.repair,
        &reporter,
        io::stdin().lock(),
        io::stdout(),
    )?;
    stats.merge(&repaired);

    println!();
    info!(
        "{} files in {}: {} verified, {} without checksum",
        stats.files,
        format!("{:.2}s", outcome.duration.as_secs_f64()).green(),
        format!("{}", stats.verified).green(),
        format!("{}", stats.skipped).yellow(),
    );
    info!(
        "{} mismatches, {} repaired, {} errors",
        format!("{}", stats.mismatches).red(),
        format!("{}", stats.repaired).green(),
        format!("{}", stats.errors).red(),
    );

    Ok(outcome.failed_scopes.is_empty())
}

/// Write back collected mismatches once confirmed. `--repair` confirms
/// without asking; anything but a yes leaves the filecache untouched.
fn settle_pending(
    engine: &Engine,
    pending: &[Mismatch],
    repair_requested: bool,
    reporter: &dyn ScanReporter,
    input: impl BufRead,
    output: impl Write,
) -> io::Result<ScanStats> {
    if pending.is_empty() {
        return Ok(ScanStats::default());
    }

    let confirmed = repair_requested
        || prompt_confirm(
            input,
            output,
            &format!("Repair {} mismatched checksums?", pending.len()),
            Some(false),
        )?;
    if !confirmed {
        info!("Leaving {} mismatches unrepaired", pending.len());
        return Ok(ScanStats::default());
    }
    Ok(engine.repair(pending, reporter))
}

/// `Ok(false)` when at least one user could not be indexed.
fn run_index(config: AppConfig, args: &IndexArgs) -> anyhow::Result<bool> {
    let engine = Engine::open(config).context("Cannot open filecache")?;
    let reporter = CliReporter::new();
    let outcome = engine.index(&args.users, args.with_checksums, &reporter);
    reporter.finish_bar();
    let outcome = outcome?;

    println!();
    info!(
        "Indexed in {}: {} added, {} updated, {} removed, {} hashed, {} errors",
        format!("{:.2}s", outcome.duration.as_secs_f64()).green(),
        format!("{}", outcome.stats.added).cyan(),
        format!("{}", outcome.stats.updated).cyan(),
        format!("{}", outcome.stats.removed).cyan(),
        format!("{}", outcome.stats.hashed).cyan(),
        format!("{}", outcome.stats.errors).red(),
    );

    Ok(outcome.failed_users.is_empty())
}

fn prompt_confirm(
    mut input: impl BufRead,
    mut output: impl Write,
    prompt: &str,
    default: Option<bool>,
) -> io::Result<bool> {
    let mut line = String::new();

    loop {
        line.clear();

        match default {
            Some(true) => write!(output, "{} (Y/n): ", prompt)?,
            Some(false) | None => write!(output, "{} (y/N): ", prompt)?,
        }
        output.flush()?;

        // EOF on a closed stdin counts as the default.
        if input.read_line(&mut line)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match line.trim().to_uppercase().as_str() {
            "Y" | "YES" => return Ok(true),
            "N" | "NO" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
