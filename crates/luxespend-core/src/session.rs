//! Dashboard session
//!
//! Ties the transaction store to the advice trigger. User actions go through
//! `Session::dispatch`; the returned `Outcome` says what happened and, when
//! the transaction count lands on a milestone (after an add or a delete),
//! carries an `AdviceTicket` the caller runs in the background and hands
//! back through `complete_advice`. `initial_advice` covers a list that is
//! already on a milestone when the session opens.
//!
//! Only the most recent ticket counts. Starting a new request, clearing the
//! list, or emptying it by deletion invalidates any ticket still in flight,
//! so a slow provider can never overwrite a newer tip.

use serde::Serialize;
use tracing::debug;

use crate::advice::{Advisor, MilestonePolicy, FALLBACK_TIP};
use crate::aggregate::{compute_category_breakdown, compute_totals, Slice, Totals};
use crate::error::Error;
use crate::models::{Transaction, TransactionDraft};
use crate::storage::StorageSlot;
use crate::store::TransactionStore;

/// Advisor panel text shown before any transactions exist
pub const ONBOARDING_MESSAGE: &str =
    "Start adding transactions to get your personalized AI financial strategy.";

/// Advisor panel text shown when no tip has been fetched yet
pub const PENDING_MESSAGE: &str = "Analyzing your spending patterns...";

/// Shown instead of a chart when there are no expenses
pub const INSUFFICIENT_DATA_MESSAGE: &str = "Insufficient expense data to display chart.";

/// A user action
#[derive(Debug, Clone)]
pub enum Action {
    Add(TransactionDraft),
    Delete(String),
    Reset { confirmed: bool },
    RefreshAdvice,
}

/// State of the advisor panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum AdvicePanel {
    Onboarding,
    Idle,
    Loading,
    Ready(String),
}

impl AdvicePanel {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Text to display; `None` while loading
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Onboarding => Some(ONBOARDING_MESSAGE),
            Self::Idle => Some(PENDING_MESSAGE),
            Self::Loading => None,
            Self::Ready(tip) => Some(tip),
        }
    }
}

/// A pending advice request: a snapshot of the list plus its generation
#[derive(Debug, Clone)]
pub struct AdviceTicket {
    generation: u64,
    transactions: Vec<Transaction>,
}

/// Result of running an `AdviceTicket`
#[derive(Debug, Clone)]
pub struct AdviceResult {
    generation: u64,
    pub tip: String,
}

impl AdviceResult {
    /// Fallback tip for `generation`, used when the request never produced a result
    pub fn fallback(generation: u64) -> Self {
        Self {
            generation,
            tip: FALLBACK_TIP.to_string(),
        }
    }
}

impl AdviceTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Ask `advisor` for a tip about the snapshot
    pub async fn run(self, advisor: &Advisor) -> AdviceResult {
        let tip = advisor.advise(&self.transactions).await;
        AdviceResult {
            generation: self.generation,
            tip,
        }
    }
}

/// What a dispatched action did
#[derive(Debug, Default)]
pub struct Outcome {
    /// Record created by an add
    pub added: Option<Transaction>,
    /// Whether a delete or reset removed anything
    pub removed: bool,
    /// Inline message for the user (invalid input, nothing to do, ...)
    pub notice: Option<String>,
    /// Advice request to start, if this action triggered one
    pub advice: Option<AdviceTicket>,
}

/// How the spending chart should render
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "slices", rename_all = "snake_case")]
pub enum ChartState {
    InsufficientData,
    Slices(Vec<Slice>),
}

/// Everything the dashboard view shows
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub totals: Totals,
    pub chart: ChartState,
    pub advice: AdvicePanel,
    pub transaction_count: usize,
    pub recent: Vec<Transaction>,
}

pub struct Session<S> {
    store: TransactionStore<S>,
    advisor: Advisor,
    policy: MilestonePolicy,
    panel: AdvicePanel,
    generation: u64,
}

impl<S: StorageSlot> Session<S> {
    pub fn new(store: TransactionStore<S>, advisor: Advisor, policy: MilestonePolicy) -> Self {
        let panel = if store.is_empty() {
            AdvicePanel::Onboarding
        } else {
            AdvicePanel::Idle
        };
        Self {
            store,
            advisor,
            policy,
            panel,
            generation: 0,
        }
    }

    pub fn store(&self) -> &TransactionStore<S> {
        &self.store
    }

    pub fn advisor(&self) -> &Advisor {
        &self.advisor
    }

    pub fn policy(&self) -> MilestonePolicy {
        self.policy
    }

    /// Advice request for the list as loaded, when its size is a milestone
    ///
    /// Call once after opening a session.
    pub fn initial_advice(&mut self) -> Option<AdviceTicket> {
        if self.policy.is_milestone(self.store.len()) {
            Some(self.start_advice())
        } else {
            None
        }
    }

    pub fn advice_panel(&self) -> &AdvicePanel {
        &self.panel
    }

    pub fn dispatch(&mut self, action: Action) -> Outcome {
        match action {
            Action::Add(draft) => self.add(draft),
            Action::Delete(id) => self.delete(&id),
            Action::Reset { confirmed } => self.reset(confirmed),
            Action::RefreshAdvice => self.refresh(),
        }
    }

    /// Apply a finished request; returns false for a stale result
    pub fn complete_advice(&mut self, result: AdviceResult) -> bool {
        if result.generation != self.generation || !self.panel.is_loading() {
            debug!(
                generation = result.generation,
                current = self.generation,
                "Ignoring stale advice"
            );
            return false;
        }
        self.panel = AdvicePanel::Ready(result.tip);
        true
    }

    /// View model for the dashboard, with up to `recent` newest transactions
    pub fn dashboard(&self, recent: usize) -> Dashboard {
        let transactions = self.store.transactions();
        let breakdown = compute_category_breakdown(transactions);
        let chart = if breakdown.is_empty() {
            ChartState::InsufficientData
        } else {
            ChartState::Slices(breakdown.slices())
        };

        Dashboard {
            totals: compute_totals(transactions),
            chart,
            advice: self.panel.clone(),
            transaction_count: transactions.len(),
            recent: transactions.iter().take(recent).cloned().collect(),
        }
    }

    fn add(&mut self, draft: TransactionDraft) -> Outcome {
        let added = match self.store.add(draft) {
            Ok(tx) => tx.clone(),
            Err(Error::InvalidInput(msg)) => {
                return Outcome {
                    notice: Some(msg),
                    ..Outcome::default()
                }
            }
            Err(e) => {
                return Outcome {
                    notice: Some(e.to_string()),
                    ..Outcome::default()
                }
            }
        };

        if matches!(self.panel, AdvicePanel::Onboarding) {
            self.panel = AdvicePanel::Idle;
        }

        let advice = if self.policy.is_milestone(self.store.len()) {
            Some(self.start_advice())
        } else {
            None
        };

        Outcome {
            added: Some(added),
            advice,
            ..Outcome::default()
        }
    }

    fn delete(&mut self, id: &str) -> Outcome {
        let removed = self.store.delete(id);
        self.settle_if_empty();

        let advice = if removed && self.policy.is_milestone(self.store.len()) {
            Some(self.start_advice())
        } else {
            None
        };

        Outcome {
            removed,
            notice: (!removed).then(|| format!("No transaction with id {}", id)),
            advice,
            ..Outcome::default()
        }
    }

    fn reset(&mut self, confirmed: bool) -> Outcome {
        let removed = self.store.reset_all(|| confirmed);
        if !removed {
            return Outcome {
                notice: Some("Reset cancelled.".to_string()),
                ..Outcome::default()
            };
        }
        self.settle_if_empty();
        Outcome {
            removed,
            ..Outcome::default()
        }
    }

    fn refresh(&mut self) -> Outcome {
        if self.store.is_empty() {
            return Outcome {
                notice: Some("Add a transaction first.".to_string()),
                ..Outcome::default()
            };
        }
        Outcome {
            advice: Some(self.start_advice()),
            ..Outcome::default()
        }
    }

    fn start_advice(&mut self) -> AdviceTicket {
        self.generation += 1;
        self.panel = AdvicePanel::Loading;
        AdviceTicket {
            generation: self.generation,
            transactions: self.store.transactions().to_vec(),
        }
    }

    fn settle_if_empty(&mut self) {
        if self.store.is_empty() {
            // Drop any in-flight request
            self.generation += 1;
            self.panel = AdvicePanel::Onboarding;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{AdviceClient, MockBackend};
    use crate::models::{Category, TransactionType};
    use crate::storage::MemorySlot;
    use crate::store::STORAGE_KEY;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn session_with(mock: MockBackend) -> Session<MemorySlot> {
        let advisor = Advisor::new(Some(AdviceClient::Mock(mock)), Duration::from_secs(5));
        Session::new(
            TransactionStore::load(MemorySlot::new()),
            advisor,
            MilestonePolicy::default(),
        )
    }

    fn session() -> Session<MemorySlot> {
        session_with(MockBackend::replying("Tip"))
    }

    fn expense(amount: f64) -> Action {
        Action::Add(TransactionDraft::new(
            TransactionType::Expense,
            Category::Food,
            amount,
        ))
    }

    #[test]
    fn test_new_session_shows_onboarding() {
        let session = session();
        assert_eq!(session.advice_panel(), &AdvicePanel::Onboarding);
        assert_eq!(session.advice_panel().text(), Some(ONBOARDING_MESSAGE));
    }

    #[test]
    fn test_milestone_trigger_on_third_and_sixth_add() {
        let mut session = session();
        let triggered: Vec<bool> = (1..=6)
            .map(|i| session.dispatch(expense(i as f64)).advice.is_some())
            .collect();
        assert_eq!(triggered, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn test_delete_back_to_milestone_triggers_advice() {
        let mut session = session();
        for i in 1..=4 {
            session.dispatch(expense(i as f64));
        }
        let id = session.store().transactions()[0].id.clone();

        let outcome = session.dispatch(Action::Delete(id));
        assert!(outcome.removed);
        let ticket = outcome.advice.expect("three left is a milestone");
        assert_eq!(ticket.transactions().len(), 3);
        assert!(session.advice_panel().is_loading());

        // Deleting down to two is not
        let id = session.store().transactions()[0].id.clone();
        assert!(session.dispatch(Action::Delete(id)).advice.is_none());
    }

    #[test]
    fn test_delete_missing_does_not_trigger_advice() {
        let mut session = session();
        for i in 1..=3 {
            session.dispatch(expense(i as f64));
        }
        let outcome = session.dispatch(Action::Delete("nope".to_string()));
        assert!(outcome.advice.is_none());
    }

    #[test]
    fn test_initial_advice_on_loaded_milestone() {
        let mut seeded = TransactionStore::load(MemorySlot::new());
        for i in 1..=3 {
            seeded
                .add(TransactionDraft::new(
                    TransactionType::Expense,
                    Category::Rent,
                    i as f64,
                ))
                .unwrap();
        }
        let slot = seeded.slot().clone();

        let mut session = Session::new(
            TransactionStore::load(slot),
            Advisor::offline(),
            MilestonePolicy::default(),
        );
        assert_eq!(session.advice_panel(), &AdvicePanel::Idle);
        let ticket = session.initial_advice().expect("three loaded is a milestone");
        assert_eq!(ticket.transactions().len(), 3);
        assert!(session.advice_panel().is_loading());
    }

    #[test]
    fn test_initial_advice_skipped_off_milestone() {
        let mut session = session();
        assert!(session.initial_advice().is_none());
        session.dispatch(expense(1.0));
        assert!(session.initial_advice().is_none());
        assert_eq!(session.advice_panel(), &AdvicePanel::Idle);
    }

    #[test]
    fn test_fallback_result_resolves_loading_panel() {
        let mut session = session();
        session.dispatch(expense(1.0));
        let ticket = session.dispatch(Action::RefreshAdvice).advice.unwrap();

        assert!(session.complete_advice(AdviceResult::fallback(ticket.generation())));
        assert_eq!(
            session.advice_panel(),
            &AdvicePanel::Ready(FALLBACK_TIP.to_string())
        );
    }

    #[test]
    fn test_invalid_add_reports_notice() {
        let mut session = session();
        let outcome = session.dispatch(expense(0.0));
        assert!(outcome.added.is_none());
        assert!(outcome.advice.is_none());
        assert_eq!(
            outcome.notice.as_deref(),
            Some(crate::store::INVALID_AMOUNT_NOTICE)
        );
        assert_eq!(session.store().len(), 0);
    }

    #[tokio::test]
    async fn test_ticket_completes_panel() {
        let mut session = session();
        session.dispatch(expense(1.0));
        session.dispatch(expense(2.0));
        let ticket = session.dispatch(expense(3.0)).advice.unwrap();
        assert!(session.advice_panel().is_loading());
        assert_eq!(ticket.transactions().len(), 3);

        let result = ticket.run(&session.advisor().clone()).await;
        assert!(session.complete_advice(result));
        assert_eq!(session.advice_panel(), &AdvicePanel::Ready("Tip".to_string()));
    }

    #[tokio::test]
    async fn test_stale_ticket_is_ignored() {
        let mut session = session();
        for i in 1..=3 {
            session.dispatch(expense(i as f64));
        }
        let advisor = session.advisor().clone();
        let first = session.dispatch(Action::RefreshAdvice).advice.unwrap();
        let second = session.dispatch(Action::RefreshAdvice).advice.unwrap();
        assert!(second.generation() > first.generation());

        let stale = first.run(&advisor).await;
        assert!(!session.complete_advice(stale));
        assert!(session.advice_panel().is_loading());

        let fresh = second.run(&advisor).await;
        assert!(session.complete_advice(fresh));
    }

    #[tokio::test]
    async fn test_reset_invalidates_in_flight_request() {
        let mut session = session();
        for i in 1..=3 {
            session.dispatch(expense(i as f64));
        }
        let advisor = session.advisor().clone();
        let ticket = session.dispatch(Action::RefreshAdvice).advice.unwrap();

        let outcome = session.dispatch(Action::Reset { confirmed: true });
        assert!(outcome.removed);
        assert_eq!(session.advice_panel(), &AdvicePanel::Onboarding);

        let result = ticket.run(&advisor).await;
        assert!(!session.complete_advice(result));
        assert_eq!(session.advice_panel(), &AdvicePanel::Onboarding);
    }

    #[test]
    fn test_reset_without_confirmation_keeps_data() {
        let mut session = session();
        session.dispatch(expense(5.0));
        let outcome = session.dispatch(Action::Reset { confirmed: false });
        assert!(!outcome.removed);
        assert_eq!(session.store().len(), 1);
    }

    #[test]
    fn test_reset_with_confirmation_persists_empty_list() {
        let mut session = session();
        session.dispatch(expense(5.0));
        session.dispatch(Action::Reset { confirmed: true });
        assert_eq!(session.store().len(), 0);
        assert_eq!(
            session.store().slot().get(STORAGE_KEY).as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_delete_missing_is_notice_only() {
        let mut session = session();
        session.dispatch(expense(5.0));
        let outcome = session.dispatch(Action::Delete("nope".to_string()));
        assert!(!outcome.removed);
        assert!(outcome.notice.is_some());
        assert_eq!(session.store().len(), 1);
    }

    #[test]
    fn test_refresh_on_empty_list_does_nothing() {
        let mut session = session();
        let outcome = session.dispatch(Action::RefreshAdvice);
        assert!(outcome.advice.is_none());
        assert_eq!(session.advice_panel(), &AdvicePanel::Onboarding);
    }

    #[test]
    fn test_dashboard_scenario() {
        let mut session = session();
        session.dispatch(Action::Add(
            TransactionDraft::new(TransactionType::Expense, Category::Food, 50.0)
                .on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
        ));
        session.dispatch(Action::Add(
            TransactionDraft::new(TransactionType::Income, Category::Salary, 1000.0)
                .on(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
        ));

        let dashboard = session.dashboard(5);
        assert_eq!(dashboard.totals.income, 1000.0);
        assert_eq!(dashboard.totals.expenses, 50.0);
        assert_eq!(dashboard.totals.balance, 950.0);
        assert_eq!(dashboard.transaction_count, 2);
        assert_eq!(dashboard.recent[0].category, Category::Salary);
        match dashboard.chart {
            ChartState::Slices(slices) => {
                assert_eq!(slices.len(), 1);
                assert_eq!(slices[0].category, Category::Food);
                assert_eq!(slices[0].amount, 50.0);
            }
            ChartState::InsufficientData => panic!("expected slices"),
        }
    }

    #[test]
    fn test_dashboard_empty_is_insufficient_data() {
        let session = session();
        let dashboard = session.dashboard(5);
        assert_eq!(dashboard.chart, ChartState::InsufficientData);
        assert_eq!(dashboard.totals, Totals::default());
        assert!(dashboard.recent.is_empty());
    }
}
