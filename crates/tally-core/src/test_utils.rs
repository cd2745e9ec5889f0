//! Test utilities for tally-core
//!
//! This module provides testing infrastructure including a mock Ollama server
//! that can be used for development and integration tests.

use axum::{
    extract::Json,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

use crate::ai::prompt_field;

/// Prompts containing this marker get an HTTP 500 from the mock server
pub const FAIL_MARKER: &str = "FAIL_ME";

/// Mock Ollama server for testing and development
pub struct MockOllamaServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOllamaServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate));

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
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check, model listing)
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![
            ModelInfo {
                name: "llama3.1:8b".to_string(),
                modified_at: "2024-01-01T00:00:00Z".to_string(),
                size: 4_900_000_000,
            },
            ModelInfo {
                name: "qwen2.5:7b".to_string(),
                modified_at: "2024-01-01T00:00:00Z".to_string(),
                size: 4_700_000_000,
            },
        ],
    })
}

/// Ollama generate endpoint
async fn handle_generate(Json(request): Json<GenerateRequest>) -> Response {
    if request.prompt.contains(FAIL_MARKER) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "model crashed").into_response();
    }

    Json(GenerateResponse {
        model: request.model,
        response: categorize_mock(&request.prompt),
        done: true,
    })
    .into_response()
}

/// Answer a categorization prompt
///
/// Trusts the keyword suggestion when the prompt has one, otherwise guesses
/// from a few well-known merchants. Padded with whitespace and chatter so
/// reply parsing gets exercised.
fn categorize_mock(prompt: &str) -> String {
    let description = prompt_field(prompt, "Description:").unwrap_or("Unknown");
    let d = description.to_uppercase();

    let (category, explanation) = if let Some(suggested) = prompt_field(prompt, "Suggested:") {
        (suggested.to_string(), format!("{} matches the {} keywords", description, suggested))
    } else if d.contains("ZOMATO") || d.contains("SWIGGY") || d.contains("CAFE") {
        ("Food".to_string(), "Food delivery or dining".to_string())
    } else if d.contains("NEFT") || d.contains("IMPS") {
        ("Personal Spending".to_string(), "Person-to-person transfer".to_string())
    } else {
        ("Miscellaneous".to_string(), "No clear category".to_string())
    };

    format!(
        "\n  Here is my answer.\nCategory: {}\nExplanation: {}\n",
        category, explanation
    )
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

#[derive(Debug, Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
    modified_at: String,
    size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{parse_category_reply, AIBackend, OllamaBackend};
    use crate::error::Error;

    #[tokio::test]
    async fn test_mock_server_health_check() {
        let server = MockOllamaServer::start().await;
        let client = OllamaBackend::new(&server.url(), "test-model");

        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_mock_server_list_models() {
        let server = MockOllamaServer::start().await;
        let client = OllamaBackend::new(&server.url(), "test-model");

        let models = client.list_models().await.unwrap();
        assert_eq!(models, vec!["llama3.1:8b", "qwen2.5:7b"]);
    }

    #[tokio::test]
    async fn test_mock_server_uses_suggestion() {
        let server = MockOllamaServer::start().await;
        let client = OllamaBackend::new(&server.url(), "test-model");

        let reply = client
            .classify("Description: UPWORK ESCROW\nSuggested: Income\n")
            .await
            .unwrap();
        assert!(reply.starts_with("Here is my answer."));
        let result = parse_category_reply(&reply);
        assert_eq!(result.category, "Income");
        assert_eq!(result.explanation, "UPWORK ESCROW matches the Income keywords");
    }

    #[tokio::test]
    async fn test_mock_server_guesses_without_suggestion() {
        let server = MockOllamaServer::start().await;
        let client = OllamaBackend::new(&server.url(), "test-model");

        let reply = client.classify("Description: SWIGGY BLR").await.unwrap();
        assert_eq!(parse_category_reply(&reply).category, "Food");
    }

    #[tokio::test]
    async fn test_mock_server_failure_status() {
        let server = MockOllamaServer::start().await;
        let client = OllamaBackend::new(&server.url(), "test-model");

        let err = client
            .classify("Description: FAIL_ME STORE")
            .await
            .unwrap_err();
        match err {
            Error::Classification(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("model crashed"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
