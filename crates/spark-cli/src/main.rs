//! QuickSpark CLI - food-truck business insight engine
//!
//! Usage:
//!   quickspark init --seed truck.toml   Initialize database and catalog
//!   quickspark import --file feed.csv   Import a POS sales feed
//!   quickspark insights                 Run an analysis cycle
//!   quickspark social --live            Draft a scarcity post

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init { seed } => commands::cmd_init(&cli.db, seed.as_deref()),
        Commands::Record {
            item,
            quantity,
            amount,
            customer,
            at,
            id,
        } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_record(
                &db,
                &item,
                quantity,
                amount,
                customer.as_deref(),
                at.as_deref(),
                id.as_deref(),
            )
        }
        Commands::Import { file } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_import(&db, &file)
        }
        Commands::Insights { as_of, json } => {
            let db = commands::open_db(&cli.db)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_insights(&db, config, as_of.as_deref(), json)
        }
        Commands::Classify { customer, as_of } => {
            let db = commands::open_db(&cli.db)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_classify(&db, &config, &customer, as_of.as_deref())
        }
        Commands::Social { live, as_of } => {
            let db = commands::open_db(&cli.db)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_social(&db, config, live, as_of.as_deref()).await
        }
        Commands::Menu => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_menu(&db)
        }
        Commands::Events => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_events(&db)
        }
        Commands::Transactions { limit } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_transactions(&db, limit)
        }
        Commands::Status => commands::cmd_status(&cli.db),
    }
}
