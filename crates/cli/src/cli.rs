//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::DriveMode;
use std::path::PathBuf;

/// Lockstep - replay and merge event sources in timestamp order
#[derive(Parser, Debug)]
#[command(
    name = "lockstep",
    author,
    version,
    about = "Lockstep event dispatcher",
    long_about = "Drives historical and realtime event sources in lockstep.\n\n\
                  Loads a scenario, builds its subjects, dispatches every event in \n\
                  timestamp order and prints the merged event stream."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LOCKSTEP_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "LOCKSTEP_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scenario through the dispatcher
    Run(RunArgs),

    /// Validate a scenario file without running it
    Validate(ValidateArgs),

    /// Display scenario information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to scenario file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "scenario.toml",
        env = "LOCKSTEP_SCENARIO"
    )]
    pub config: PathBuf,

    /// Override the drive mode from the scenario
    #[arg(long, value_enum, env = "LOCKSTEP_MODE")]
    pub mode: Option<ModeArg>,

    /// Override the round limit from the scenario (0 = unlimited)
    #[arg(long, env = "LOCKSTEP_MAX_ROUNDS")]
    pub max_rounds: Option<u64>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "LOCKSTEP_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate the scenario and exit without dispatching
    #[arg(long)]
    pub dry_run: bool,

    /// Do not print the merged event stream
    #[arg(long)]
    pub no_events: bool,

    /// Output events and summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to scenario file to validate
    #[arg(short, long, default_value = "scenario.toml", env = "LOCKSTEP_SCENARIO")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to scenario file
    #[arg(short, long, default_value = "scenario.toml", env = "LOCKSTEP_SCENARIO")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// List every historical event
    #[arg(long)]
    pub events: bool,
}

/// Drive mode override
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Blocking run to completion
    Run,
    /// Round-by-round stepping
    Step,
}

impl From<ModeArg> for DriveMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Run => DriveMode::Run,
            ModeArg::Step => DriveMode::Step,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
