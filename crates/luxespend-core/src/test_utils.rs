//! Test utilities for luxespend-core
//!
//! This module provides a mock advice provider server speaking the Gemini,
//! OpenAI-compatible and Ollama wire formats, so the HTTP backends can be
//! exercised end to end without network access.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// How the mock server answers advice requests
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Reply with this tip text
    Tip(String),
    /// Reply successfully with blank text
    Empty,
    /// Reply with HTTP 500
    Error,
    /// Wait before replying with the tip
    Slow(Duration, String),
}

#[derive(Default)]
struct Recorded {
    last_prompt: Option<String>,
    last_api_key: Option<String>,
    requests: usize,
}

#[derive(Clone)]
struct ServerState {
    mode: MockMode,
    recorded: Arc<Mutex<Recorded>>,
}

/// Mock advice provider for testing and development
pub struct MockAdviceServer {
    addr: SocketAddr,
    recorded: Arc<Mutex<Recorded>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockAdviceServer {
    /// Start a server replying with a fixed tip on an available port
    pub async fn start() -> Self {
        Self::start_with(MockMode::Tip(
            "1. Cook at home.\n2. Automate savings.\n3. Review subscriptions.".to_string(),
        ))
        .await
    }

    pub async fn start_with(mode: MockMode) -> Self {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let state = ServerState {
            mode,
            recorded: recorded.clone(),
        };

        let app = Router::new()
            .route(
                "/v1beta/models/:model",
                get(handle_gemini_model).post(handle_gemini_generate),
            )
            .route("/v1/chat/completions", post(handle_chat_completions))
            .route("/v1/models", get(handle_models))
            .route("/api/generate", post(handle_ollama_generate))
            .route("/api/tags", get(handle_tags))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            recorded,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Prompt text of the most recent advice request
    pub fn last_prompt(&self) -> Option<String> {
        self.recorded.lock().unwrap().last_prompt.clone()
    }

    /// API key sent with the most recent request, from whichever header carried it
    pub fn last_api_key(&self) -> Option<String> {
        self.recorded.lock().unwrap().last_api_key.clone()
    }

    /// Number of advice requests received
    pub fn requests(&self) -> usize {
        self.recorded.lock().unwrap().requests
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAdviceServer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl ServerState {
    /// Record the request and resolve the reply text, or an error status
    async fn reply(&self, prompt: String, api_key: Option<String>) -> Result<String, StatusCode> {
        {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.last_prompt = Some(prompt);
            recorded.last_api_key = api_key;
            recorded.requests += 1;
        }

        match &self.mode {
            MockMode::Tip(text) => Ok(text.clone()),
            MockMode::Empty => Ok(String::new()),
            MockMode::Error => Err(StatusCode::INTERNAL_SERVER_ERROR),
            MockMode::Slow(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
        }
    }
}

fn header(headers: &axum::http::HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start_matches("Bearer ").to_string())
}

fn error_response(status: StatusCode) -> Response {
    (status, Json(json!({"error": {"message": "mock failure"}}))).into_response()
}

/// Gemini model metadata (health check)
async fn handle_gemini_model(Path(model): Path<String>) -> Json<Value> {
    Json(json!({ "name": format!("models/{}", model) }))
}

/// Gemini `models/{model}:generateContent`
async fn handle_gemini_generate(
    State(state): State<ServerState>,
    Path(model): Path<String>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !model.ends_with(":generateContent") {
        return error_response(StatusCode::NOT_FOUND);
    }

    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    match state.reply(prompt, header(&headers, "x-goog-api-key")).await {
        Ok(text) => Json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        }))
        .into_response(),
        Err(status) => error_response(status),
    }
}

/// OpenAI-compatible chat completions
async fn handle_chat_completions(
    State(state): State<ServerState>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let prompt = body["messages"]
        .as_array()
        .and_then(|m| m.last())
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default()
        .to_string();

    match state.reply(prompt, header(&headers, "authorization")).await {
        Ok(text) => Json(json!({
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": text },
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        Err(status) => error_response(status),
    }
}

/// OpenAI-compatible model list (health check)
async fn handle_models() -> Json<Value> {
    Json(json!({ "data": [{ "id": "mock-model", "object": "model" }] }))
}

/// Ollama generate endpoint
async fn handle_ollama_generate(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> Response {
    let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
    let model = body["model"].as_str().unwrap_or("mock").to_string();

    match state.reply(prompt, None).await {
        Ok(text) => Json(json!({ "model": model, "response": text, "done": true })).into_response(),
        Err(status) => error_response(status),
    }
}

/// Ollama tags endpoint (health check)
async fn handle_tags() -> Json<Value> {
    Json(json!({
        "models": [{ "name": "llama3.2:latest", "modified_at": "2024-01-01T00:00:00Z", "size": 4_000_000_000u64 }]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{
        AdviceBackend, AdviceClient, Advisor, GeminiBackend, OllamaBackend,
        OpenAICompatibleBackend, EMPTY_REPLY_TIP, FALLBACK_TIP,
    };
    use crate::models::{Category, Transaction, TransactionType};
    use chrono::NaiveDate;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn list() -> Vec<Transaction> {
        vec![
            Transaction {
                id: "a".to_string(),
                amount: 1000.0,
                transaction_type: TransactionType::Income,
                category: Category::Salary,
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                note: "Payday".to_string(),
            },
            Transaction {
                id: "b".to_string(),
                amount: 50.0,
                transaction_type: TransactionType::Expense,
                category: Category::Food,
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                note: "Private note".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_gemini_round_trip() {
        let server = MockAdviceServer::start_with(MockMode::Tip("Save 20%.".to_string())).await;
        let backend = GeminiBackend::new(&server.url(), "gemini-test", "secret", TIMEOUT);

        let tip = backend.request_advice(&list()).await.unwrap();
        assert_eq!(tip, "Save 20%.");
        assert_eq!(server.last_api_key().as_deref(), Some("secret"));

        let prompt = server.last_prompt().unwrap();
        assert!(prompt.contains("3 short, actionable financial tips"));
        assert!(prompt.contains(r#""category":"Salary""#));
        assert!(!prompt.contains("Private note"));
        assert!(backend.health_check().await);
    }

    #[tokio::test]
    async fn test_openai_compatible_round_trip() {
        let server = MockAdviceServer::start().await;
        let backend = OpenAICompatibleBackend::with_api_key(&server.url(), "m", "tok", TIMEOUT);

        let tip = backend.request_advice(&list()).await.unwrap();
        assert!(tip.starts_with("1. Cook at home."));
        assert_eq!(server.last_api_key().as_deref(), Some("tok"));
        assert!(backend.health_check().await);
    }

    #[tokio::test]
    async fn test_ollama_round_trip() {
        let server = MockAdviceServer::start().await;
        let backend = OllamaBackend::new(&server.url(), "llama3.2", TIMEOUT);

        let tip = backend.request_advice(&list()).await.unwrap();
        assert!(tip.contains("Automate savings"));
        assert_eq!(server.requests(), 1);
        assert!(backend.health_check().await);
    }

    #[tokio::test]
    async fn test_provider_error_falls_back() {
        let server = MockAdviceServer::start_with(MockMode::Error).await;
        let backend = GeminiBackend::new(&server.url(), "gemini-test", "k", TIMEOUT);
        assert!(backend.request_advice(&list()).await.is_err());

        let advisor = Advisor::new(Some(AdviceClient::Gemini(backend)), TIMEOUT);
        assert_eq!(advisor.advise(&list()).await, FALLBACK_TIP);
    }

    #[tokio::test]
    async fn test_blank_reply_uses_empty_reply_tip() {
        let server = MockAdviceServer::start_with(MockMode::Empty).await;
        let backend = OllamaBackend::new(&server.url(), "llama3.2", TIMEOUT);
        let advisor = Advisor::new(Some(AdviceClient::Ollama(backend)), TIMEOUT);
        assert_eq!(advisor.advise(&list()).await, EMPTY_REPLY_TIP);
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let server = MockAdviceServer::start_with(MockMode::Slow(
            Duration::from_secs(3),
            "late".to_string(),
        ))
        .await;
        let backend = GeminiBackend::new(&server.url(), "gemini-test", "k", TIMEOUT);
        let advisor = Advisor::new(
            Some(AdviceClient::Gemini(backend)),
            Duration::from_millis(200),
        );
        assert_eq!(advisor.advise(&list()).await, FALLBACK_TIP);
    }

    #[tokio::test]
    async fn test_unreachable_host_falls_back() {
        let mut server = MockAdviceServer::start().await;
        let url = server.url();
        server.stop();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let backend = OllamaBackend::new(&url, "llama3.2", Duration::from_secs(1));
        let advisor = Advisor::new(Some(AdviceClient::Ollama(backend)), TIMEOUT);
        assert_eq!(advisor.advise(&list()).await, FALLBACK_TIP);
    }
}
