mod categories;
mod classifier;
mod cli;
mod error;
mod export;
mod fmt;
mod importer;
mod models;
mod pipeline;
mod reports;
mod reviewer;
mod settings;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ConfigCommands};

fn init_logging(verbose: bool) {
    let default = if verbose { "treasurer=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Categories => cli::categories::list(),
        Commands::Classify {
            statement,
            interactive,
            review,
        } => cli::classify::run(&statement, interactive, review.as_deref()),
        Commands::Pending { statement } => cli::pending::run(&statement),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Set {
                organization_name,
                export_dir,
            } => cli::config::set(organization_name, export_dir),
        },
    };

    if let Err(e) = result {
        tracing::debug!("command failed: {e:?}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
