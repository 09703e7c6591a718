//! LuxeSpend CLI - Personal finance tracker
//!
//! Usage:
//!   luxespend add --amount 12.50 --category food    Record an expense
//!   luxespend dashboard                             Totals, chart and tip
//!   luxespend list                                  Transaction history
//!   luxespend shell                                 Interactive session

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.data_dir.as_deref())?;

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Dashboard { json } => {
            let mut session = commands::open_session(&config)?;
            commands::cmd_dashboard(&mut session, json).await
        }
        Commands::Add {
            amount,
            kind,
            category,
            date,
            note,
        } => {
            let mut session = commands::open_session(&config)?;
            commands::cmd_add(
                &mut session,
                &amount,
                &kind,
                &category,
                date.as_deref(),
                note.as_deref(),
            )
            .await
        }
        Commands::List { limit } => {
            let session = commands::open_session(&config)?;
            commands::cmd_list(&session, limit)
        }
        Commands::Delete { id } => {
            let mut session = commands::open_session(&config)?;
            commands::cmd_delete(&mut session, &id).await
        }
        Commands::Reset { yes } => {
            let mut session = commands::open_session(&config)?;
            commands::cmd_reset(&mut session, yes)
        }
        Commands::Advice { check } => {
            let mut session = commands::open_session(&config)?;
            if check {
                commands::cmd_advice_check(&session).await
            } else {
                commands::cmd_advice(&mut session).await
            }
        }
        Commands::Categories => commands::cmd_categories(),
        Commands::Shell => {
            let session = commands::open_session(&config)?;
            commands::cmd_shell(session).await
        }
    }
}
