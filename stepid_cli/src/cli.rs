//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "stepid", version, about = "Motor step-response identification")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/stepid.toml")]
    pub config: PathBuf,

    /// Log as JSON lines and print results as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); defaults to [logging] level or info
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the step experiment on the link and identify the motor
    Step {
        /// Use the simulated motor instead of the serial device
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
        /// Serial device node (takes precedence over link.device)
        #[arg(long, value_name = "PATH")]
        device: Option<String>,
        /// Override experiment.before_time (device ticks)
        #[arg(long, value_name = "TICKS")]
        before: Option<i64>,
        /// Override experiment.step_time (device ticks)
        #[arg(long, value_name = "TICKS")]
        step: Option<i64>,
        /// Override experiment.after_time (device ticks)
        #[arg(long, value_name = "TICKS")]
        after: Option<i64>,
    },
    /// Identify the motor from a recorded telemetry transcript
    Replay {
        /// File with one telemetry line per line, as read from the link
        #[arg(long, value_name = "FILE")]
        transcript: PathBuf,
    },
    /// Short simulated experiment end to end
    SelfCheck,
}
