//! Shared utilities for commands
//!
//! This module contains:
//! - `load_config` - Resolve config file, environment and `--data-dir`
//! - `open_session` - Open the file-backed store and wire up the advisor
//! - `parse_draft` - Turn raw CLI input into a `TransactionDraft`

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use luxespend_core::{
    Advisor, Category, Config, FileSlot, MilestonePolicy, Session, StorageSlot, TransactionDraft,
    TransactionStore, TransactionType, INVALID_AMOUNT_NOTICE,
};
use tracing::debug;

/// Load configuration; an explicit `--data-dir` wins over everything else
pub fn load_config(config_path: Option<&Path>, data_dir: Option<&Path>) -> Result<Config> {
    let mut config = Config::load(config_path).context("Failed to load config")?;
    if let Some(dir) = data_dir {
        config.storage.data_dir = Some(dir.to_path_buf());
    }
    Ok(config)
}

/// Open the session backed by `<data_dir>/luxespend_transactions.json`
pub fn open_session(config: &Config) -> Result<Session<FileSlot>> {
    let dir = config.data_dir();
    let slot = FileSlot::new(dir.clone())
        .with_context(|| format!("Failed to open data directory {}", dir.display()))?;
    debug!("Using data directory {}", slot.dir().display());
    Ok(build_session(TransactionStore::load(slot), config))
}

/// Wire a loaded store to the configured advisor and milestone interval
pub fn build_session<S: StorageSlot>(store: TransactionStore<S>, config: &Config) -> Session<S> {
    Session::new(
        store,
        Advisor::from_config(&config.advice),
        MilestonePolicy::new(config.advice.every),
    )
}

/// Parse raw form input
///
/// The error is a notice meant for the user. Amounts that parse but are not
/// positive are left for the store to reject.
pub fn parse_draft(
    amount: &str,
    kind: &str,
    category: &str,
    date: Option<&str>,
    note: Option<&str>,
) -> std::result::Result<TransactionDraft, String> {
    let amount = amount.trim().parse::<f64>().ok();
    if amount.is_none() {
        return Err(INVALID_AMOUNT_NOTICE.to_string());
    }

    let transaction_type: TransactionType = kind.parse()?;
    let category: Category = category
        .parse()
        .map_err(|e| format!("{} (run 'luxespend categories')", e))?;

    let mut draft = TransactionDraft {
        amount,
        transaction_type,
        category,
        note: note.unwrap_or_default().to_string(),
        ..TransactionDraft::default()
    };

    if let Some(d) = date {
        draft.date = NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
            .map_err(|_| format!("Please enter a valid date (YYYY-MM-DD): {}", d))?;
    }

    Ok(draft)
}
