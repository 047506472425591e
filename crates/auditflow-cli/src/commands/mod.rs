use std::path::Path;

use anyhow::{Context, Result};
use auditflow_core::{AppConfig, AuditService};

use crate::cli::Commands;

mod session;
mod support;
mod web;

use self::session::handle_session;
use self::web::{WebServeOptions, serve};

pub(crate) fn run(db: &Path, command: Commands) -> Result<()> {
    let config = AppConfig::from_env().context("invalid auditflow configuration")?;
    let service = AuditService::open(config, db)
        .with_context(|| format!("failed to open session store at {}", db.display()))?;
    tracing::debug!(db = %db.display(), advisor = service.advisor_name(), "session store ready");

    match command {
        Commands::Serve(args) => serve(
            &service,
            WebServeOptions {
                host: &args.host,
                port: args.port,
            },
        ),
        Commands::Session(args) => handle_session(&service, args.command),
    }
}

#[cfg(test)]
mod tests;
