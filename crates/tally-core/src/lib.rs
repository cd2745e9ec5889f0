//! Tally Core Library
//!
//! Bank statement categorization:
//! - CSV reading for ragged statement exports
//! - Ledger location and account-detail extraction
//! - Keyword category table with built-in defaults
//! - Prompt library for customizable categorization prompts
//! - Pluggable local AI backends (Ollama, mock)
//! - Row-by-row annotation pipeline with CSV output

pub mod ai;
pub mod categories;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod statement;

/// Test utilities including mock Ollama server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{parse_category_reply, AIBackend, AIClient, MockBackend, OllamaBackend};
pub use categories::{Category, CategoryTable};
pub use config::{BackendKind, Config, OllamaConfig};
pub use error::{Error, Result};
pub use export::{CsvRowSink, MemorySink, RowSink};
pub use models::{
    AnnotatedTransaction, ClassificationResult, Direction, MetadataBlock, RawRow,
    TransactionRecord,
};
pub use pipeline::{AnnotationLayout, ProcessSummary, StatementPipeline};
pub use prompts::{Prompt, PromptId, PromptLibrary};
pub use statement::{parse_statement, ParsedStatement};
