mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mediacanon_core::{load_config, validate_config, Pipeline, Toolchain};

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    // Usage errors are fatal (1); --help and --version are not errors.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(if e.use_stderr() { 1 } else { 0 });
        }
    };

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(!cli.no_color))
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    validate_config(&config).context("Configuration validation failed")?;

    let root = cli.resolve_root()?;
    let mode = cli.mode();
    info!(
        "mediacanon {} starting in {} mode",
        env!("CARGO_PKG_VERSION"),
        mode
    );

    let tools = Toolchain::from_config(&config.tools);
    let pipeline = Pipeline::new(config, tools);
    let report = pipeline
        .run(&root, mode)
        .await
        .with_context(|| format!("Run over {:?} aborted", root))?;

    report.log_summary();
    Ok(ExitCode::from(report.exit_code()))
}
