//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Insurance package catalogue backend with upload reconciliation.
#[derive(Parser, Debug)]
#[command(name = "coverdesk-server", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server (default).
    Serve,
    /// Reconcile a local JSON / CSV / XLSX file into the packages collection.
    Import {
        /// File to import; the format is taken from its extension.
        file: PathBuf,
        /// Overwrite stored packages that differ instead of reporting conflicts.
        #[arg(long)]
        force: bool,
    },
}
