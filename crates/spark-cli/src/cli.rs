//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// QuickSpark - turn the truck's sales feed into operational signals
#[derive(Parser)]
#[command(name = "quickspark")]
#[command(about = "Food-truck business insight engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "quickspark.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine config TOML; built-in defaults apply when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and load a seed file
    Init {
        /// Seed TOML with [[items]], [[events]], [[customers]]
        #[arg(short, long)]
        seed: Option<PathBuf>,
    },

    /// Record a single sale
    Record {
        /// Catalog item id (e.g., t2)
        #[arg(long)]
        item: String,

        /// Units sold
        #[arg(long, default_value = "1")]
        quantity: i64,

        /// Total amount; defaults to price * quantity
        #[arg(long)]
        amount: Option<f64>,

        /// Customer id to credit the visit to
        #[arg(long)]
        customer: Option<String>,

        /// RFC 3339 timestamp; defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Transaction id; generated when omitted
        #[arg(long)]
        id: Option<String>,
    },

    /// Import a POS CSV feed
    Import {
        /// CSV file with timestamp,item_id,quantity,amount,customer_id,id
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Run an analysis cycle and print insights
    Insights {
        /// RFC 3339 analysis instant; defaults to now
        #[arg(long)]
        as_of: Option<String>,

        /// Print insights as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a customer into a behavioral cohort
    Classify {
        /// Customer id
        customer: String,

        /// RFC 3339 analysis instant; defaults to now
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Draft a scarcity social post from the current insights
    Social {
        /// Style the post via the generative backend (falls back to the
        /// deterministic template on any failure)
        #[arg(long)]
        live: bool,

        /// RFC 3339 analysis instant; defaults to now
        #[arg(long)]
        as_of: Option<String>,
    },

    /// List the menu catalog
    Menu,

    /// List the event calendar
    Events,

    /// List recent transactions
    Transactions {
        /// Maximum rows to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show database status
    Status,
}
