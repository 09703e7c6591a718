//! Transaction store
//!
//! Holds the newest-first transaction list and mirrors it into a
//! `StorageSlot` after every mutation. Persistence failures are logged and
//! swallowed so the interactive session keeps working.

use std::collections::HashSet;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionDraft};
use crate::storage::StorageSlot;

/// Key of the slot holding the serialized transaction list
pub const STORAGE_KEY: &str = "luxespend_transactions";

/// Notice shown when a draft has no usable amount
pub const INVALID_AMOUNT_NOTICE: &str = "Please enter a valid amount";

pub struct TransactionStore<S> {
    slot: S,
    transactions: Vec<Transaction>,
}

impl<S: StorageSlot> TransactionStore<S> {
    /// Rehydrate from `slot`
    ///
    /// An absent, unreadable or unparsable payload yields an empty list.
    pub fn load(slot: S) -> Self {
        let transactions = match slot.read(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Transaction>>(&raw) {
                Ok(list) => dedupe_ids(list),
                Err(e) => {
                    warn!(error = %e, "Stored transactions are corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored transactions, starting empty");
                Vec::new()
            }
        };

        info!(count = transactions.len(), "Loaded transactions");
        Self { slot, transactions }
    }

    /// Record a new transaction and return it
    ///
    /// Rejects drafts whose amount is missing, non-finite or not positive;
    /// the list is left untouched in that case.
    pub fn add(&mut self, draft: TransactionDraft) -> Result<&Transaction> {
        let amount = match draft.amount {
            Some(a) if a.is_finite() && a > 0.0 => a,
            _ => return Err(Error::InvalidInput(INVALID_AMOUNT_NOTICE.to_string())),
        };

        let note = if draft.note.trim().is_empty() {
            draft.category.as_str().to_string()
        } else {
            draft.note
        };

        let transaction = Transaction {
            id: self.fresh_id(),
            amount,
            transaction_type: draft.transaction_type,
            category: draft.category,
            date: draft.date,
            note,
        };

        info!(
            id = %transaction.id,
            kind = %transaction.transaction_type,
            category = %transaction.category,
            "Adding transaction"
        );
        self.transactions.insert(0, transaction);
        self.persist();

        Ok(&self.transactions[0])
    }

    /// Remove the transaction with `id`; returns whether one was removed
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        let removed = self.transactions.len() != before;
        if removed {
            info!(id = %id, "Deleted transaction");
        }
        self.persist();
        removed
    }

    /// Clear every transaction if `confirm` agrees
    ///
    /// Returns true when the list was cleared. A declined confirmation
    /// changes nothing and writes nothing.
    pub fn reset_all(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if !confirm() {
            return false;
        }
        info!(count = self.transactions.len(), "Resetting all transactions");
        self.transactions.clear();
        self.persist();
        true
    }

    /// Transactions, newest first
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&self) {
        let payload = match serde_json::to_string(&self.transactions) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Failed to serialize transactions");
                return;
            }
        };
        if let Err(e) = self.slot.write(STORAGE_KEY, &payload) {
            warn!(error = %e, "Failed to persist transactions");
        }
    }
}

/// Drop later records that reuse an earlier id
fn dedupe_ids(list: Vec<Transaction>) -> Vec<Transaction> {
    let mut seen = HashSet::new();
    let total = list.len();
    let unique: Vec<Transaction> = list
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect();
    if unique.len() != total {
        warn!(
            dropped = total - unique.len(),
            "Stored transactions contained duplicate ids"
        );
    }
    unique
}
