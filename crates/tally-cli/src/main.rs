//! Tally CLI - Bank statement categorizer
//!
//! Usage:
//!   tally process --input statement.csv --output out/   Annotate a statement
//!   tally inspect --input statement.csv                 Preview parsed rows
//!   tally categories                                    Print the category table
//!   tally ollama test                                   Check the Ollama server

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use tally_core::{AnnotationLayout, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > --log level (default info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(cli.log.as_filter())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Process {
            input,
            output,
            model,
            categories,
            split,
            name_from_metadata,
        } => {
            let layout = if split {
                AnnotationLayout::Split
            } else {
                AnnotationLayout::Combined
            };
            commands::cmd_process(
                &config,
                &input,
                &output,
                model.as_deref(),
                categories.as_deref(),
                layout,
                name_from_metadata,
            )
            .await
            .map(|_| ())
        }
        Commands::Inspect {
            input,
            categories,
            json,
        } => commands::cmd_inspect(&config, &input, categories.as_deref(), json),
        Commands::Categories { categories } => {
            commands::cmd_categories(&config, categories.as_deref())
        }
        Commands::Ollama { action } => match action {
            OllamaAction::Test { description } => {
                commands::cmd_ollama_test(&config, description.as_deref()).await
            }
            OllamaAction::Models => commands::cmd_ollama_models(&config).await,
        },
    }
}
