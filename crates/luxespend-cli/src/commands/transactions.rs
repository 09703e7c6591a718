//! Transaction commands: add, list, delete, categories

use anyhow::Result;
use luxespend_core::{Action, AdviceTicket, Category, Session, StorageSlot, Transaction};

use super::{fetch_advice, format_currency, parse_draft, print_advice_panel, truncate};

pub async fn cmd_add<S: StorageSlot>(
    session: &mut Session<S>,
    amount: &str,
    kind: &str,
    category: &str,
    date: Option<&str>,
    note: Option<&str>,
) -> Result<()> {
    let draft = match parse_draft(amount, kind, category, date, note) {
        Ok(d) => d,
        Err(notice) => {
            println!("⚠️  {}", notice);
            return Ok(());
        }
    };

    let outcome = session.dispatch(Action::Add(draft));
    if let Some(notice) = outcome.notice {
        println!("⚠️  {}", notice);
        return Ok(());
    }

    if let Some(ref tx) = outcome.added {
        println!("✅ Added {}", describe(tx));
    }

    if let Some(ticket) = outcome.advice {
        println!(
            "🤖 {} transactions recorded, asking for advice...",
            session.store().len()
        );
        fetch_advice(session, ticket).await;
        println!();
        print_advice_panel(session.advice_panel());
    }

    Ok(())
}

pub fn cmd_list<S: StorageSlot>(session: &Session<S>, limit: usize) -> Result<()> {
    let transactions = session.store().transactions();

    if transactions.is_empty() {
        println!("No transactions yet. Add one with:");
        println!("  luxespend add --amount 12.50 --category food");
        return Ok(());
    }

    println!();
    println!(
        "📝 Transactions ({} of {})",
        limit.min(transactions.len()),
        transactions.len()
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions.iter().take(limit) {
        print_transaction_row(tx);
    }

    Ok(())
}

pub async fn cmd_delete<S: StorageSlot>(session: &mut Session<S>, id: &str) -> Result<()> {
    if let Some(ticket) = delete_transaction(session, id) {
        println!(
            "🤖 {} transactions left, asking for advice...",
            session.store().len()
        );
        fetch_advice(session, ticket).await;
        println!();
        print_advice_panel(session.advice_panel());
    }
    Ok(())
}

/// Delete by id or id prefix, reporting the result
///
/// Returns the advice request when the remaining count lands on a milestone.
pub fn delete_transaction<S: StorageSlot>(
    session: &mut Session<S>,
    id: &str,
) -> Option<AdviceTicket> {
    let id = match resolve_id(session.store().transactions(), id) {
        Ok(full) => full,
        Err(notice) => {
            println!("⚠️  {}", notice);
            return None;
        }
    };

    let outcome = session.dispatch(Action::Delete(id.clone()));
    if outcome.removed {
        println!("🗑️  Deleted transaction {}", id);
    } else if let Some(notice) = outcome.notice {
        println!("⚠️  {}", notice);
    }
    outcome.advice
}

pub fn cmd_categories() -> Result<()> {
    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────");
    for category in Category::all() {
        println!("   {}", category);
    }
    Ok(())
}

/// One row of the transaction history
pub fn print_transaction_row(tx: &Transaction) {
    let amount_str = if tx.is_expense() {
        format!("\x1b[31m-{}\x1b[0m", format_currency(tx.amount)) // Red for expenses
    } else {
        format!("\x1b[32m+{}\x1b[0m", format_currency(tx.amount)) // Green for income
    };

    println!(
        "   {} │ {:>22} │ {:<13} │ {:<30} │ \x1b[2m{}\x1b[0m",
        tx.date,
        amount_str,
        tx.category,
        truncate(&tx.note, 30),
        short_id(&tx.id)
    );
}

fn describe(tx: &Transaction) -> String {
    let sign = if tx.is_income() { "+" } else { "-" };
    format!(
        "{}{} {} on {} ({})",
        sign,
        format_currency(tx.amount),
        tx.category,
        tx.date,
        short_id(&tx.id)
    )
}

/// First block of a uuid, enough to address it with `delete`
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Expand an id prefix to the full id of exactly one transaction
///
/// An unknown prefix is passed through unchanged so the session reports it.
pub fn resolve_id(transactions: &[Transaction], prefix: &str) -> std::result::Result<String, String> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err("Please enter a transaction id".to_string());
    }
    if transactions.iter().any(|t| t.id == prefix) {
        return Ok(prefix.to_string());
    }

    let matches: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.id.starts_with(prefix))
        .collect();
    match matches.as_slice() {
        [one] => Ok(one.id.clone()),
        [] => Ok(prefix.to_string()),
        many => Err(format!(
            "Id {} is ambiguous ({} matches), use more characters",
            prefix,
            many.len()
        )),
    }
}
