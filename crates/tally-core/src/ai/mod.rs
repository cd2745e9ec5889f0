//! Pluggable classification backend abstraction
//!
//! The pipeline only needs one capability from a model: turn a prompt into a
//! text reply. This module provides that interface and its implementations.
//!
//! # Architecture
//!
//! - `AIBackend` trait: the classification capability
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `MockBackend`
//! - `parsing`: turns free-text replies into `ClassificationResult`s
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = Config::load(None)?;
//! let client = AIClient::from_config(&config);
//! let reply = client.classify("Analyze and categorize this bank transaction: ...").await?;
//! let result = parse_category_reply(&reply);
//! ```

mod mock;
mod ollama;
pub mod parsing;

pub use mock::MockBackend;
#[cfg(any(test, feature = "test-utils"))]
pub(crate) use mock::prompt_field;
pub use ollama::OllamaBackend;
pub use parsing::parse_category_reply;

use async_trait::async_trait;

use crate::config::{BackendKind, Config};
use crate::error::Result;

/// Trait defining the classification capability
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Send a prompt and return the model's raw text reply
    ///
    /// Fails with `Error::Classification` or `Error::Http` when the backend
    /// cannot produce a reply.
    async fn classify(&self, prompt: &str) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from a resolved configuration
    pub fn from_config(config: &Config) -> Self {
        match config.backend {
            BackendKind::Ollama => AIClient::Ollama(OllamaBackend::from_config(&config.ollama)),
            BackendKind::Mock => AIClient::Mock(MockBackend::new()),
        }
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        AIClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different model
    ///
    /// Used for runtime model override (e.g., `--model` on the command line)
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AIClient::Ollama(b) => AIClient::Ollama(b.with_model(model)),
            AIClient::Mock(b) => AIClient::Mock(b.with_model(model)),
        }
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn classify(&self, prompt: &str) -> Result<String> {
        match self {
            AIClient::Ollama(b) => b.classify(prompt).await,
            AIClient::Mock(b) => b.classify(prompt).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
