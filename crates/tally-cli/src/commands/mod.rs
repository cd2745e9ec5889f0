//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (category table and prompt resolution)
//! - `process` - Statement categorization
//! - `inspect` - Dry-run view of a parsed statement
//! - `categories` - Category table output
//! - `ollama` - Ollama connectivity commands (test, models)

pub mod categories;
pub mod core;
pub mod inspect;
pub mod ollama;
pub mod process;

// Re-export command functions for main.rs
pub use categories::*;
pub use core::*;
pub use inspect::*;
pub use ollama::*;
pub use process::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
