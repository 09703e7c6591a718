//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config loading, session setup, draft parsing)
//! - `advice` - Manual advice refresh and advisor panel output
//! - `dashboard` - Totals, spending chart and advisor panel
//! - `reset` - Delete all transactions behind a confirmation prompt
//! - `shell` - Interactive session with background advice requests
//! - `transactions` - Transaction commands (add, list, delete, categories)

pub mod advice;
pub mod core;
pub mod dashboard;
pub mod reset;
pub mod shell;
pub mod transactions;

// Re-export command functions for main.rs
pub use advice::*;
pub use core::*;
pub use dashboard::*;
pub use reset::*;
pub use shell::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount as dollars with thousands separators, e.g. `-$1,234.50`
pub fn format_currency(value: f64) -> String {
    let cents = format!("{:.2}", value.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((&cents, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac)
}
