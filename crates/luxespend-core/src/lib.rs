//! LuxeSpend Core Library
//!
//! Shared functionality for the LuxeSpend personal finance tracker:
//! - Transaction model and newest-first store with pluggable persistence
//! - Income/expense totals and per-category spending breakdown
//! - Pluggable advice backends (Gemini, OpenAI-compatible, Ollama)
//! - Milestone-triggered advice with timeout and fallback tips
//! - Dashboard session tying user actions to the advisor panel
//! - Layered TOML + environment configuration

pub mod advice;
pub mod aggregate;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;
pub mod store;

/// Test utilities including a mock advice provider server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advice::{
    AdviceBackend, AdviceClient, Advisor, GeminiBackend, MilestonePolicy, MockBackend, MockReply,
    OllamaBackend, OpenAICompatibleBackend, EMPTY_LIST_TIP, EMPTY_REPLY_TIP, FALLBACK_TIP,
};
pub use aggregate::{
    compute_category_breakdown, compute_totals, CategoryBreakdown, Slice, Totals,
};
pub use config::{AdviceConfig, BackendKind, Config, StorageConfig};
pub use error::{Error, Result};
pub use models::{Category, Transaction, TransactionDraft, TransactionType};
pub use session::{
    Action, AdvicePanel, AdviceResult, AdviceTicket, ChartState, Dashboard, Outcome, Session,
};
pub use storage::{FileSlot, MemorySlot, StorageSlot};
pub use store::{TransactionStore, INVALID_AMOUNT_NOTICE, STORAGE_KEY};
