//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// LuxeSpend - Track spending and get AI financial tips
#[derive(Parser)]
#[command(name = "luxespend")]
#[command(about = "Personal finance tracker with AI spending advice", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding the transaction file
    ///
    /// Defaults to the platform data directory, or LUXESPEND_DATA_DIR if set.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show totals, spending chart and the latest tip
    Dashboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a transaction
    Add {
        /// Amount (must be greater than zero)
        #[arg(short, long, allow_hyphen_values = true)]
        amount: String,

        /// Transaction type: income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: String,

        /// Category (see `luxespend categories`)
        #[arg(short, long, default_value = "Other")]
        category: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// Free-form note, defaults to the category name
        #[arg(short, long)]
        note: Option<String>,
    },

    /// List transactions, newest first
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Delete a transaction by id
    Delete {
        /// Transaction id (from `luxespend list`)
        id: String,
    },

    /// Delete all transactions
    Reset {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Ask for a fresh financial tip now
    Advice {
        /// Show the configured backend and test that it responds instead
        #[arg(long)]
        check: bool,
    },

    /// List available categories
    Categories,

    /// Interactive session (default when no command is given)
    Shell,
}
