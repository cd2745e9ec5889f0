//! Shared utilities for commands
//!
//! This module contains:
//! - `load_categories` - Resolve the category table from flag, config, or defaults
//! - `load_prompt` - Resolve the categorization prompt (override or embedded)
//! - `build_client` - Build the AI client with an optional model override

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::ai::{AIBackend, AIClient};
use tally_core::prompts::{Prompt, PromptId, PromptLibrary};
use tally_core::{CategoryTable, Config};
use tracing::debug;

/// Load the category table
///
/// Priority: `--categories` flag > `categories` in config > built-in table
pub fn load_categories(config: &Config, flag: Option<&Path>) -> Result<CategoryTable> {
    match flag.or(config.categories.as_deref()) {
        Some(path) => {
            let table = CategoryTable::load(path)
                .with_context(|| format!("Failed to load categories: {}", path.display()))?;
            debug!("Loaded {} categories from {}", table.len(), path.display());
            Ok(table)
        }
        None => Ok(CategoryTable::default()),
    }
}

/// Load the categorization prompt, honoring an override directory
pub fn load_prompt(config: &Config) -> Result<Prompt> {
    let mut library = match &config.prompts_dir {
        Some(dir) => PromptLibrary::with_override_dir(dir.clone()),
        None => PromptLibrary::new(),
    };

    let prompt = library
        .get(PromptId::CategorizeTransaction)
        .context("Failed to load categorization prompt")?;

    if let Some(path) = &prompt.override_path {
        debug!("Using prompt override {}", path.display());
    }
    Ok(prompt.clone())
}

/// Build the AI client from config, applying a `--model` override
pub fn build_client(config: &Config, model: Option<&str>) -> AIClient {
    let mut client = AIClient::from_config(config);
    if let Some(model) = model {
        client = client.with_model(model);
    }
    debug!("AI backend: {} ({})", client.host(), client.model());
    client
}
