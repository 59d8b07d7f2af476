#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cli;
mod error_fmt;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use clap::Parser;
use eyre::{Result, WrapErr};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::{Cli, Commands, FILE_GUARD};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = try_main(cli) {
        if json {
            println!("{}", format_error_json(&e));
        }
        eprintln!("{}", humanize(&e));
        std::process::exit(exit_code_for_error(&e));
    }
}

fn try_main(cli: Cli) -> Result<()> {
    color_eyre::install()?;

    let mut cfg = load_config(&cli.config)?;
    if let Commands::Step {
        device,
        before,
        step,
        after,
        ..
    } = &cli.cmd
    {
        // CLI overrides take precedence over the file
        if let Some(d) = device {
            cfg.link.device.clone_from(d);
        }
        if let Some(t) = before {
            cfg.experiment.before_time = *t;
        }
        if let Some(t) = step {
            cfg.experiment.step_time = *t;
        }
        if let Some(t) = after {
            cfg.experiment.after_time = *t;
        }
    }
    cfg.validate().wrap_err("invalid configuration")?;

    init_tracing(&cli, &cfg.logging)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        tracing::warn!("interrupt received; stopping capture");
        flag.store(true, Ordering::Relaxed);
    })
    .wrap_err("install Ctrl-C handler")?;

    let started = Instant::now();
    let (name, report) = match &cli.cmd {
        Commands::Step { sim, .. } => ("step", run::run_step(&cfg, *sim, shutdown)?),
        Commands::Replay { transcript } => {
            let report = run::run_replay(&cfg, transcript, shutdown)
                .wrap_err_with(|| format!("replaying {}", transcript.display()))?;
            ("replay", report)
        }
        Commands::SelfCheck => ("self-check", run::run_self_check(&cfg, shutdown)?),
    };
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if cli.json {
        println!("{}", run::report_json(name, &report, duration_ms));
    } else {
        if matches!(cli.cmd, Commands::SelfCheck) {
            println!("self-check ok");
        }
        println!(
            "{} {}",
            report.model.steady_state_velocity, report.model.time_constant
        );
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<stepid_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
    stepid_config::load_toml(&text)
        .wrap_err_with(|| format!("failed to parse config {}", path.display()))
}

fn init_tracing(cli: &Cli, logging: &stepid_config::Logging) -> Result<()> {
    let level = cli
        .log_level
        .as_deref()
        .or(logging.level.as_deref())
        .unwrap_or("info");
    // RUST_LOG wins over the flag and the file
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;

    let (json_layer, pretty_layer) = if cli.json {
        (
            Some(fmt::layer().json().with_writer(std::io::stderr)),
            None,
        )
    } else {
        (None, Some(fmt::layer().with_writer(std::io::stderr)))
    };

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {file}"))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(file_layer)
        .try_init()
        .wrap_err("initialize logging")?;
    Ok(())
}
