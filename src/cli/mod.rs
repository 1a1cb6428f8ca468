pub mod categories;
pub mod classify;
pub mod config;
pub mod pending;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "treasurer",
    about = "Classify bank statement transactions into IRS nonprofit filing categories."
)]
pub struct Cli {
    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// The statement file and the period it covers.
#[derive(Args, Debug, Clone)]
pub struct StatementArgs {
    /// CSV or XLSX statement with Description and Amount columns
    pub file: String,
    /// Reporting month: 1-12
    #[arg(long)]
    pub month: u32,
    /// Reporting year: YYYY
    #[arg(long)]
    pub year: i32,
    /// Directory for exported files (default: configured export_dir)
    #[arg(long = "output-dir")]
    pub output_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the IRS categories.
    Categories,
    /// Classify a statement, apply review decisions and write all exports.
    Classify {
        #[command(flatten)]
        statement: StatementArgs,
        /// Review flagged rows interactively
        #[arg(long, conflicts_with = "review")]
        interactive: bool,
        /// Edited review sheet to merge (from `treasurer pending`)
        #[arg(long)]
        review: Option<String>,
    },
    /// Write the rows that need review to a sheet for offline editing.
    Pending {
        #[command(flatten)]
        statement: StatementArgs,
    },
    /// Show or change settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the current settings.
    Show,
    /// Update one or more settings.
    Set {
        /// Organization name printed on reports
        #[arg(long = "organization-name")]
        organization_name: Option<String>,
        /// Default directory for exports
        #[arg(long = "export-dir")]
        export_dir: Option<String>,
    },
}
