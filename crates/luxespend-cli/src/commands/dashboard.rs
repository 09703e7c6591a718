use anyhow::{Context, Result};
use luxespend_core::session::INSUFFICIENT_DATA_MESSAGE;
use luxespend_core::{ChartState, Dashboard, Session, StorageSlot};

use super::{fetch_advice, format_currency, print_advice_panel, print_transaction_row};

/// Width of a full chart bar, in cells
const BAR_WIDTH: usize = 24;

/// Recent transactions shown under the chart
const RECENT_LIMIT: usize = 5;

pub async fn cmd_dashboard<S: StorageSlot>(session: &mut Session<S>, json: bool) -> Result<()> {
    // A list loaded on a milestone gets its tip before the first render
    if let Some(ticket) = session.initial_advice() {
        fetch_advice(session, ticket).await;
    }

    let dashboard = session.dashboard(RECENT_LIMIT);

    if json {
        let out = serde_json::to_string_pretty(&dashboard)
            .context("Failed to serialize dashboard")?;
        println!("{}", out);
        return Ok(());
    }

    print_dashboard(&dashboard);
    Ok(())
}

pub fn print_dashboard(dashboard: &Dashboard) {
    let totals = &dashboard.totals;

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│         💎 LuxeSpend Dashboard          │");
    println!("╰─────────────────────────────────────────╯");
    println!();

    let balance = if totals.balance < 0.0 {
        format!("\x1b[31m{}\x1b[0m", format_currency(totals.balance))
    } else {
        format_currency(totals.balance)
    };
    println!("  💰 Balance:   {}", balance);
    println!(
        "  📈 Income:    \x1b[32m+{}\x1b[0m",
        format_currency(totals.income)
    );
    println!(
        "  📉 Expenses:  \x1b[31m-{}\x1b[0m",
        format_currency(totals.expenses)
    );
    println!();

    println!("  📊 Spending by Category");
    match &dashboard.chart {
        ChartState::InsufficientData => println!("     {}", INSUFFICIENT_DATA_MESSAGE),
        ChartState::Slices(slices) => {
            for slice in slices {
                println!(
                    "     {:<13} {:<width$} {:>5.1}%  {}",
                    slice.category.as_str(),
                    render_bar(slice.percent, BAR_WIDTH),
                    slice.percent,
                    format_currency(slice.amount),
                    width = BAR_WIDTH
                );
            }
        }
    }
    println!();

    print_advice_panel(&dashboard.advice);

    if dashboard.transaction_count > 0 {
        println!(
            "  📝 Recent Transactions ({} total)",
            dashboard.transaction_count
        );
        for tx in &dashboard.recent {
            print_transaction_row(tx);
        }
        println!();
    }
}

/// Horizontal bar for a percentage; any non-zero share gets at least one cell
pub fn render_bar(percent: f64, width: usize) -> String {
    let share = (percent.clamp(0.0, 100.0) / 100.0 * width as f64).round() as usize;
    let cells = if percent > 0.0 { share.max(1) } else { 0 };
    "█".repeat(cells.min(width))
}
