//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Tally - Categorize bank statement transactions with a local LLM
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Annotate bank statement exports with AI categories", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging (same as --log debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log: LogLevel,

    /// Config file (defaults to ~/.local/share/tally/config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Categorize every transaction in a statement and write an annotated copy
    Process {
        /// Statement CSV to process
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (created if missing)
        #[arg(short, long)]
        output: PathBuf,

        /// Model to use (overrides config and OLLAMA_MODEL)
        #[arg(short, long)]
        model: Option<String>,

        /// JSON category table (defaults to the built-in table)
        #[arg(short, long)]
        categories: Option<PathBuf>,

        /// Write category and explanation as separate columns
        #[arg(long)]
        split: bool,

        /// Name the output after the statement period instead of the input file
        #[arg(long)]
        name_from_metadata: bool,
    },

    /// Show what would be sent for categorization (no AI calls)
    Inspect {
        /// Statement CSV to inspect
        #[arg(short, long)]
        input: PathBuf,

        /// JSON category table (defaults to the built-in table)
        #[arg(short, long)]
        categories: Option<PathBuf>,

        /// Print the parsed statement as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective category table as JSON
    Categories {
        /// JSON category table (defaults to the built-in table)
        #[arg(short, long)]
        categories: Option<PathBuf>,
    },

    /// Test the Ollama connection
    Ollama {
        #[command(subcommand)]
        action: OllamaAction,
    },
}

#[derive(Subcommand)]
pub enum OllamaAction {
    /// Check connectivity, list models, and run a sample categorization
    Test {
        /// Categorize this description instead of the built-in samples
        #[arg(long)]
        description: Option<String>,
    },

    /// List models installed on the Ollama server
    Models,
}
