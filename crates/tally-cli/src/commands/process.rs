//! Statement processing command

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tally_core::export::{output_file_name, statement_file_name, CsvRowSink};
use tally_core::import::read_rows_from_path;
use tally_core::statement::{extract_metadata, locate_table};
use tally_core::{AIBackend, AnnotationLayout, Config, StatementPipeline};
use tracing::info;

use super::{build_client, load_categories, load_prompt};

/// Categorize a statement and write the annotated copy into `output_dir`
///
/// Returns the path of the written file. A statement without a ledger header
/// is rejected before any output file is created.
pub async fn cmd_process(
    config: &Config,
    input: &Path,
    output_dir: &Path,
    model: Option<&str>,
    categories: Option<&Path>,
    layout: AnnotationLayout,
    name_from_metadata: bool,
) -> Result<PathBuf> {
    info!("Processing file: {}", input.display());

    let rows = read_rows_from_path(input)
        .with_context(|| format!("Failed to read statement: {}", input.display()))?;
    let header_index = locate_table(&rows)
        .with_context(|| format!("Not a statement export: {}", input.display()))?;

    let categories = load_categories(config, categories)?;
    let prompt = load_prompt(config)?;
    let client = build_client(config, model);

    let file_name = if name_from_metadata {
        statement_file_name(&extract_metadata(&rows[..header_index]))
    } else {
        output_file_name(input)
    };

    fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;
    let output_path = output_dir.join(file_name);

    println!(
        "🏷️  Categorizing {} with {} ({})...",
        input.display(),
        client.model(),
        client.host()
    );

    let file = File::create(&output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;
    let mut sink = CsvRowSink::new(file);

    let pipeline = StatementPipeline::new(&client, &categories, &prompt).with_layout(layout);
    let summary = pipeline
        .process(&rows, &mut sink)
        .await
        .context("Statement processing failed")?;
    sink.into_inner()
        .with_context(|| format!("Failed to finish writing {}", output_path.display()))?;

    println!("   Transactions: {}", summary.transactions);
    println!("   Keyword hints: {}", summary.keyword_matches);
    println!("   Classified: {}", summary.classified);
    if summary.failures > 0 {
        println!("   ⚠️  Failed: {} (marked as Error)", summary.failures);
    }
    if summary.passed_through > 0 {
        println!("   Other rows kept as-is: {}", summary.passed_through);
    }
    println!("✅ Saved {}", output_path.display());

    info!("Processing complete. File saved as {}", output_path.display());
    Ok(output_path)
}
