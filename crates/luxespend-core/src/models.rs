//! Domain models for LuxeSpend

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Whether money came in or went out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" | "in" => Ok(Self::Income),
            "expense" | "out" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fixed set of spending/earning categories
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Category {
    Food,
    Travel,
    Rent,
    Shopping,
    #[serde(rename = "EMI")]
    Emi,
    Entertainment,
    Health,
    Salary,
    #[default]
    Other,
}

impl Category {
    /// Display name, also used as the persisted value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Travel => "Travel",
            Self::Rent => "Rent",
            Self::Shopping => "Shopping",
            Self::Emi => "EMI",
            Self::Entertainment => "Entertainment",
            Self::Health => "Health",
            Self::Salary => "Salary",
            Self::Other => "Other",
        }
    }

    /// Get all categories in form order
    pub fn all() -> &'static [Category] {
        &[
            Self::Food,
            Self::Travel,
            Self::Rent,
            Self::Shopping,
            Self::Emi,
            Self::Entertainment,
            Self::Health,
            Self::Salary,
            Self::Other,
        ]
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded income or expense event
///
/// Never mutated after creation. The JSON field names match the persisted
/// layout (`type` rather than `transaction_type`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: Category,
    pub date: NaiveDate,
    pub note: String,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }
}

/// Form input for a new transaction (no id yet)
///
/// `amount` stays optional so a blank amount field can be represented and
/// rejected by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub amount: Option<f64>,
    pub transaction_type: TransactionType,
    pub category: Category,
    pub date: NaiveDate,
    pub note: String,
}

impl Default for TransactionDraft {
    fn default() -> Self {
        Self {
            amount: None,
            transaction_type: TransactionType::Expense,
            category: Category::Other,
            date: Local::now().date_naive(),
            note: String::new(),
        }
    }
}

impl TransactionDraft {
    /// Draft with the required fields set and today's date
    pub fn new(transaction_type: TransactionType, category: Category, amount: f64) -> Self {
        Self {
            amount: Some(amount),
            transaction_type,
            category,
            ..Self::default()
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_str_is_case_insensitive() {
        assert_eq!("food".parse::<Category>().unwrap(), Category::Food);
        assert_eq!("emi".parse::<Category>().unwrap(), Category::Emi);
        assert_eq!(" Salary ".parse::<Category>().unwrap(), Category::Salary);
        assert!("groceries".parse::<Category>().is_err());
    }

    #[test]
    fn test_transaction_type_from_str() {
        assert_eq!(
            "INCOME".parse::<TransactionType>().unwrap(),
            TransactionType::Income
        );
        assert_eq!(
            "expense".parse::<TransactionType>().unwrap(),
            TransactionType::Expense
        );
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_transaction_json_layout() {
        let tx = Transaction {
            id: "abc".to_string(),
            amount: 12.5,
            transaction_type: TransactionType::Expense,
            category: Category::Emi,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            note: "Car loan".to_string(),
        };

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "EXPENSE");
        assert_eq!(json["category"], "EMI");
        assert_eq!(json["date"], "2024-01-01");
        assert_eq!(json["note"], "Car loan");
        assert!(json.get("transaction_type").is_none());
    }

    #[test]
    fn test_draft_defaults_match_form() {
        let draft = TransactionDraft::default();
        assert_eq!(draft.amount, None);
        assert_eq!(draft.transaction_type, TransactionType::Expense);
        assert_eq!(draft.category, Category::Other);
        assert!(draft.note.is_empty());
    }
}
