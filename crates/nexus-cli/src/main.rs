//! Nexus CLI - headless front-end for the Stock Nexus dashboard and moveout lists

mod cli;
mod commands;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::load_config;
use crate::commands::create::run_create;
use crate::commands::dashboard::run_dashboard;
use crate::commands::lists::run_lists;
use crate::commands::process::run_process;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nexus=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Dashboard { refresh, json } => run_dashboard(&config, refresh, json).await,
        Commands::Lists { history, json } => run_lists(&config, history, json).await,
        Commands::Process {
            list_id,
            item_id,
            quantity,
        } => run_process(&config, &list_id, &item_id, quantity).await,
        Commands::Create { items } => run_create(&config, items).await,
    }
}
