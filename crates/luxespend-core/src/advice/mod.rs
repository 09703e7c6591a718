//! Pluggable advice backend abstraction
//!
//! The advice collaborator turns a transaction list into a short block of
//! financial tips. The core only sees the `AdviceBackend` trait; the
//! `Advisor` on top of it applies the timeout and fallback texts so callers
//! always get a string back.
//!
//! # Architecture
//!
//! - `AdviceBackend` trait: the provider interface
//! - `AdviceClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `OpenAICompatibleBackend`,
//!   `OllamaBackend`, `MockBackend`
//! - `Advisor`: timeout + fallback policy, never fails
//! - `MilestonePolicy`: decides when an add should trigger a request

mod advisor;
pub mod gemini;
mod mock;
pub mod ollama;
pub mod openai_compatible;
pub mod prompt;

pub use advisor::{Advisor, MilestonePolicy};
pub use gemini::GeminiBackend;
pub use mock::{MockBackend, MockReply};
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use prompt::{EMPTY_LIST_TIP, EMPTY_REPLY_TIP, FALLBACK_TIP};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use crate::config::{AdviceConfig, BackendKind};
use crate::error::Result;
use crate::models::Transaction;

/// Trait defining the interface for all advice providers
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AdviceBackend: Send + Sync {
    /// Ask the provider for tips about `transactions`
    async fn request_advice(&self, transactions: &[Transaction]) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Short backend identifier (for logging)
    fn name(&self) -> &str;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete advice client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AdviceClient {
    Gemini(GeminiBackend),
    OpenAICompatible(OpenAICompatibleBackend),
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AdviceClient {
    /// Build the configured client
    ///
    /// Returns None when the backend is disabled or its required settings
    /// (API key for Gemini, host for the self-hosted backends) are missing.
    pub fn from_config(config: &AdviceConfig) -> Option<Self> {
        let timeout = config.timeout();
        match config.backend {
            BackendKind::Gemini => {
                let Some(ref key) = config.api_key else {
                    warn!("GEMINI_API_KEY not set, advice will use the fallback tip");
                    return None;
                };
                let host = config
                    .host
                    .as_deref()
                    .unwrap_or(gemini::DEFAULT_GEMINI_HOST);
                let model = config
                    .model
                    .as_deref()
                    .unwrap_or(gemini::DEFAULT_GEMINI_MODEL);
                Some(AdviceClient::Gemini(GeminiBackend::new(
                    host, model, key, timeout,
                )))
            }
            BackendKind::OpenaiCompatible => {
                let Some(ref host) = config.host else {
                    warn!("OPENAI_COMPATIBLE_HOST not set, advice will use the fallback tip");
                    return None;
                };
                let model = config
                    .model
                    .as_deref()
                    .unwrap_or(openai_compatible::DEFAULT_OPENAI_MODEL);
                let backend = match config.api_key {
                    Some(ref key) => {
                        OpenAICompatibleBackend::with_api_key(host, model, key, timeout)
                    }
                    None => OpenAICompatibleBackend::new(host, model, timeout),
                };
                Some(AdviceClient::OpenAICompatible(backend))
            }
            BackendKind::Ollama => {
                let Some(ref host) = config.host else {
                    warn!("OLLAMA_HOST not set, advice will use the fallback tip");
                    return None;
                };
                let model = config
                    .model
                    .as_deref()
                    .unwrap_or(ollama::DEFAULT_OLLAMA_MODEL);
                Some(AdviceClient::Ollama(OllamaBackend::new(
                    host, model, timeout,
                )))
            }
            BackendKind::Mock => Some(AdviceClient::Mock(MockBackend::new())),
            BackendKind::None => None,
        }
    }
}

// Implement AdviceBackend for AdviceClient by delegating to the inner backend
#[async_trait]
impl AdviceBackend for AdviceClient {
    async fn request_advice(&self, transactions: &[Transaction]) -> Result<String> {
        match self {
            AdviceClient::Gemini(b) => b.request_advice(transactions).await,
            AdviceClient::OpenAICompatible(b) => b.request_advice(transactions).await,
            AdviceClient::Ollama(b) => b.request_advice(transactions).await,
            AdviceClient::Mock(b) => b.request_advice(transactions).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AdviceClient::Gemini(b) => b.health_check().await,
            AdviceClient::OpenAICompatible(b) => b.health_check().await,
            AdviceClient::Ollama(b) => b.health_check().await,
            AdviceClient::Mock(b) => b.health_check().await,
        }
    }

    fn name(&self) -> &str {
        match self {
            AdviceClient::Gemini(b) => b.name(),
            AdviceClient::OpenAICompatible(b) => b.name(),
            AdviceClient::Ollama(b) => b.name(),
            AdviceClient::Mock(b) => b.name(),
        }
    }

    fn model(&self) -> &str {
        match self {
            AdviceClient::Gemini(b) => b.model(),
            AdviceClient::OpenAICompatible(b) => b.model(),
            AdviceClient::Ollama(b) => b.model(),
            AdviceClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AdviceClient::Gemini(b) => b.host(),
            AdviceClient::OpenAICompatible(b) => b.host(),
            AdviceClient::Ollama(b) => b.host(),
            AdviceClient::Mock(b) => b.host(),
        }
    }
}

/// HTTP client with a request timeout
pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build HTTP client, using defaults");
            Client::new()
        })
}
