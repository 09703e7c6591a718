//! Mock backend for testing
//!
//! Returns predictable tips without a network. Can be configured to reply
//! with blank text, fail, panic or stall, and counts how often it was asked.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::aggregate::{compute_category_breakdown, compute_totals};
use crate::error::{Error, Result};
use crate::models::Transaction;

use super::AdviceBackend;

/// What the mock answers with
#[derive(Debug, Clone, Default)]
pub enum MockReply {
    /// Tip derived from the transactions
    #[default]
    Summary,
    /// Fixed text
    Fixed(String),
    /// Blank text
    Empty,
    /// Provider error
    Fail,
    /// Panic inside the request, as a broken backend would
    Panic,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    reply: MockReply,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(text: &str) -> Self {
        Self {
            reply: MockReply::Fixed(text.to_string()),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self {
            reply: MockReply::Empty,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: MockReply::Fail,
            ..Self::default()
        }
    }

    pub fn panicking() -> Self {
        Self {
            reply: MockReply::Panic,
            ..Self::default()
        }
    }

    /// Wait `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of requests received so far (shared between clones)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdviceBackend for MockBackend {
    async fn request_advice(&self, transactions: &[Transaction]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            MockReply::Summary => Ok(summary_tip(transactions)),
            MockReply::Fixed(text) => Ok(text.clone()),
            MockReply::Empty => Ok(String::new()),
            MockReply::Fail => Err(Error::Advice("mock failure".into())),
            MockReply::Panic => panic!("mock backend panicked"),
        }
    }

    async fn health_check(&self) -> bool {
        !matches!(self.reply, MockReply::Fail | MockReply::Panic)
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

fn summary_tip(transactions: &[Transaction]) -> String {
    let totals = compute_totals(transactions);
    let top = compute_category_breakdown(transactions)
        .slices()
        .into_iter()
        .next();

    let mut tip = format!(
        "1. You have {} transactions with a balance of {:.2}.",
        transactions.len(),
        totals.balance
    );
    match top {
        Some(slice) => tip.push_str(&format!(
            "\n2. {} is your largest expense at {:.0}% of spending.",
            slice.category, slice.percent
        )),
        None => tip.push_str("\n2. No expenses recorded yet."),
    }
    tip.push_str("\n3. Set aside part of every paycheck before spending.");
    tip
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, TransactionType};
    use chrono::NaiveDate;

    fn tx(kind: TransactionType, category: Category, amount: f64) -> Transaction {
        Transaction {
            id: format!("{}", amount),
            amount,
            transaction_type: kind,
            category,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn test_summary_mentions_top_category() {
        let mock = MockBackend::new();
        let list = vec![
            tx(TransactionType::Income, Category::Salary, 1000.0),
            tx(TransactionType::Expense, Category::Rent, 300.0),
            tx(TransactionType::Expense, Category::Food, 100.0),
        ];
        let tip = mock.request_advice(&list).await.unwrap();
        assert!(tip.contains("3 transactions"));
        assert!(tip.contains("600.00"));
        assert!(tip.contains("Rent is your largest expense at 75%"));
    }

    #[tokio::test]
    async fn test_counts_calls_across_clones() {
        let mock = MockBackend::replying("Save more");
        let clone = mock.clone();
        assert_eq!(clone.request_advice(&[]).await.unwrap(), "Save more");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_and_empty() {
        assert!(MockBackend::failing().request_advice(&[]).await.is_err());
        assert!(!MockBackend::failing().health_check().await);
        assert_eq!(MockBackend::empty().request_advice(&[]).await.unwrap(), "");
    }
}
