use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    Start {
        #[arg(long)]
        resume: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    Answer {
        #[arg(long)]
        id: String,
        #[arg(long)]
        message: String,
    },
    Show {
        #[arg(long)]
        id: String,
    },
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    EmailResults {
        #[arg(long)]
        id: String,
    },
    Purge,
}
