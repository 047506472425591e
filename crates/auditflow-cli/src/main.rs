mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;

const DEFAULT_LOG_FILTER: &str = "auditflow=info,auditflow_core=info,auditflow_web=info";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    commands::run(&cli.db, cli.command)
}
