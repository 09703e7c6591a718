//! Advice prompt assembly and the fixed tip texts

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::Result;
use crate::models::{Category, Transaction, TransactionType};

/// Returned without a network call when there is nothing to analyze
pub const EMPTY_LIST_TIP: &str = "Add some transactions to get AI financial advice!";

/// Returned when the provider answers with blank text
pub const EMPTY_REPLY_TIP: &str = "Keep tracking your expenses to build wealth!";

/// Returned when the provider fails in any way
pub const FALLBACK_TIP: &str =
    "Focus on minimizing high-interest debt and building an emergency fund.";

/// Output cap passed to providers that support one
pub const MAX_OUTPUT_TOKENS: u32 = 200;

/// Sampling temperature passed to providers
pub const TEMPERATURE: f32 = 0.7;

/// Compact per-transaction record sent to the provider (no ids or notes)
#[derive(Debug, Serialize)]
pub struct TransactionSummary {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub category: Category,
    pub date: NaiveDate,
}

impl From<&Transaction> for TransactionSummary {
    fn from(t: &Transaction) -> Self {
        Self {
            transaction_type: t.transaction_type,
            amount: t.amount,
            category: t.category,
            date: t.date,
        }
    }
}

/// Build the instruction text for a list of transactions
pub fn build_prompt(transactions: &[Transaction]) -> Result<String> {
    let summary: Vec<TransactionSummary> = transactions.iter().map(Into::into).collect();
    let data = serde_json::to_string(&summary)?;
    Ok(format!(
        "Based on these transactions, give the user 3 short, actionable financial tips. \
         Keep the tone friendly but professional.\n\nTransactions: {}",
        data
    ))
}
