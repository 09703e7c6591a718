//! Derived totals and the expense breakdown
//!
//! Everything here is recomputed from the transaction list on demand;
//! nothing is cached or persisted.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Category, Transaction, TransactionType};

/// Income, expense and balance sums
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Totals {
    pub income: f64,
    pub expenses: f64,
    pub balance: f64,
}

/// Summed expense amount per category
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryBreakdown {
    sums: HashMap<Category, f64>,
}

/// One chart slice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub category: Category,
    pub amount: f64,
    /// Share of all expenses, 0-100
    pub percent: f64,
}

impl CategoryBreakdown {
    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sums.len()
    }

    pub fn get(&self, category: Category) -> Option<f64> {
        self.sums.get(&category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.sums.iter().map(|(c, v)| (*c, *v))
    }

    pub fn total(&self) -> f64 {
        self.sums.values().sum()
    }

    /// Slices sorted by amount, largest first (ties by category order)
    pub fn slices(&self) -> Vec<Slice> {
        let total = self.total();
        let mut slices: Vec<Slice> = self
            .iter()
            .map(|(category, amount)| Slice {
                category,
                amount,
                percent: if total > 0.0 {
                    amount / total * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        slices.sort_by(|a, b| {
            b.amount
                .total_cmp(&a.amount)
                .then_with(|| a.category.cmp(&b.category))
        });
        slices
    }
}

/// Sum amounts per transaction type in a single pass
pub fn compute_totals(transactions: &[Transaction]) -> Totals {
    let (income, expenses) =
        transactions
            .iter()
            .fold((0.0, 0.0), |(inc, exp), t| match t.transaction_type {
                TransactionType::Income => (inc + t.amount, exp),
                TransactionType::Expense => (inc, exp + t.amount),
            });

    Totals {
        income,
        expenses,
        balance: income - expenses,
    }
}

/// Sum expense amounts per category; income is ignored
pub fn compute_category_breakdown(transactions: &[Transaction]) -> CategoryBreakdown {
    let mut sums = HashMap::new();
    for t in transactions.iter().filter(|t| t.is_expense()) {
        *sums.entry(t.category).or_insert(0.0) += t.amount;
    }
    CategoryBreakdown { sums }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tx(kind: TransactionType, category: Category, amount: f64) -> Transaction {
        Transaction {
            id: format!("{}-{}-{}", kind, category, amount),
            amount,
            transaction_type: kind,
            category,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            note: category.to_string(),
        }
    }

    #[test]
    fn test_totals_empty() {
        assert_eq!(compute_totals(&[]), Totals::default());
    }

    #[test]
    fn test_totals_salary_and_food() {
        let list = vec![
            tx(TransactionType::Income, Category::Salary, 1000.0),
            tx(TransactionType::Expense, Category::Food, 50.0),
        ];
        let totals = compute_totals(&list);
        assert_eq!(totals.income, 1000.0);
        assert_eq!(totals.expenses, 50.0);
        assert_eq!(totals.balance, 950.0);
    }

    #[test]
    fn test_balance_is_income_minus_expenses() {
        let list = vec![
            tx(TransactionType::Income, Category::Salary, 0.1),
            tx(TransactionType::Income, Category::Other, 0.2),
            tx(TransactionType::Expense, Category::Food, 0.3),
            tx(TransactionType::Expense, Category::Travel, 1234.56),
        ];
        let totals = compute_totals(&list);
        assert_eq!(totals.balance, totals.income - totals.expenses);
        assert!(totals.balance < 0.0);
    }

    #[test]
    fn test_breakdown_ignores_income() {
        let list = vec![
            tx(TransactionType::Income, Category::Salary, 1000.0),
            tx(TransactionType::Expense, Category::Food, 50.0),
        ];
        let breakdown = compute_category_breakdown(&list);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown.get(Category::Food), Some(50.0));
        assert_eq!(breakdown.get(Category::Salary), None);
    }

    #[test]
    fn test_breakdown_empty_without_expenses() {
        assert!(compute_category_breakdown(&[]).is_empty());
        let only_income = vec![tx(TransactionType::Income, Category::Salary, 10.0)];
        assert!(compute_category_breakdown(&only_income).is_empty());
    }

    #[test]
    fn test_breakdown_sums_per_category() {
        let list = vec![
            tx(TransactionType::Expense, Category::Food, 10.0),
            tx(TransactionType::Expense, Category::Rent, 500.0),
            tx(TransactionType::Expense, Category::Food, 15.0),
        ];
        let breakdown = compute_category_breakdown(&list);
        assert_eq!(breakdown.get(Category::Food), Some(25.0));
        assert_eq!(breakdown.get(Category::Rent), Some(500.0));
        assert_eq!(breakdown.total(), 525.0);
    }

    #[test]
    fn test_slices_sorted_with_percentages() {
        let list = vec![
            tx(TransactionType::Expense, Category::Food, 25.0),
            tx(TransactionType::Expense, Category::Rent, 75.0),
        ];
        let slices = compute_category_breakdown(&list).slices();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].category, Category::Rent);
        assert_eq!(slices[0].percent, 75.0);
        assert_eq!(slices[1].category, Category::Food);
        assert_eq!(slices[1].percent, 25.0);
    }
}
