//! # Lockstep CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 场景加载与验证
//! - Dispatcher 驱动 (run / step)
//! - Ctrl-C 优雅停止

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_scenario, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "lockstep starting");

    let result = match &cli.command {
        Commands::Run(args) => run_scenario(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let config = observability::ObservabilityConfig::default()
        .with_log_format(cli.log_format.into())
        .with_default_log_level(level);

    observability::init_with_config(config)
}
