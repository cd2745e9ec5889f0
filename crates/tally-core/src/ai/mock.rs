//! Mock backend for testing
//!
//! Answers from the prompt text alone: the keyword suggestion if the prompt has
//! one, otherwise "Miscellaneous". Useful for unit tests and dry runs without a
//! running LLM server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::AIBackend;

/// Mock AI backend for testing
///
/// Returns predictable replies. Can be configured to fail for descriptions
/// containing a marker, or to answer specific descriptions with a fixed reply.
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    fail_on: Vec<String>,
    replies: Vec<(String, String)>,
    calls: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Self::default()
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self::default()
    }

    /// Create a new instance with a different model (no-op for mock)
    pub fn with_model(&self, _model: &str) -> Self {
        self.clone()
    }

    /// Fail classification for descriptions containing `marker`
    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_on.push(marker.to_uppercase());
        self
    }

    /// Answer descriptions containing `marker` with `reply` verbatim
    pub fn replying(mut self, marker: &str, reply: &str) -> Self {
        self.replies.push((marker.to_uppercase(), reply.to_string()));
        self
    }

    /// Number of classify calls made so far (shared across clones)
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn classify(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let description = prompt_field(prompt, "Description:")
            .unwrap_or_default()
            .to_uppercase();

        if self.fail_on.iter().any(|m| description.contains(m)) {
            return Err(Error::Classification(format!(
                "mock failure for \"{}\"",
                description
            )));
        }

        if let Some((_, reply)) = self.replies.iter().find(|(m, _)| description.contains(m)) {
            return Ok(reply.clone());
        }

        Ok(match prompt_field(prompt, "Suggested:") {
            Some(category) => format!(
                "Category: {}\nExplanation: Matches the keyword suggestion",
                category
            ),
            None => "Category: Miscellaneous\nExplanation: No keyword matched".to_string(),
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

/// Value of the first prompt line starting with `label`, trimmed
pub(crate) fn prompt_field<'a>(prompt: &'a str, label: &str) -> Option<&'a str> {
    prompt
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(label))
        .map(str::trim)
}
