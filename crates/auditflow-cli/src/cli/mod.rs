use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod args;
mod session;


pub use args::ServeArgs;
pub use session::{SessionArgs, SessionCommand};

#[derive(Debug, Parser)]
#[command(name = "auditflow")]
#[command(about = "AI-guided business automation audit service", version)]
pub struct Cli {
    /// SQLite database holding sessions and rate-limit windows.
    #[arg(long, default_value = ".auditflow/state.sqlite3")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the audit HTTP API.
    Serve(ServeArgs),
    /// Inspect and drive audit sessions from the terminal.
    Session(SessionArgs),
}
