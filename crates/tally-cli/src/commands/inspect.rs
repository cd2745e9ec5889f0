//! Statement inspection command

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::import::read_rows_from_path;
use tally_core::{parse_statement, Config};

use super::{load_categories, truncate};

/// Print the account details and parsed transactions of a statement
///
/// Shows each transaction's direction, amount, and keyword hint. Makes no AI
/// calls.
pub fn cmd_inspect(
    config: &Config,
    input: &Path,
    categories: Option<&Path>,
    json: bool,
) -> Result<()> {
    let rows = read_rows_from_path(input)
        .with_context(|| format!("Failed to read statement: {}", input.display()))?;
    let statement = parse_statement(&rows)
        .with_context(|| format!("Not a statement export: {}", input.display()))?;
    let categories = load_categories(config, categories)?;

    if json {
        let hints: Vec<Option<&str>> = statement
            .transactions
            .iter()
            .map(|r| categories.match_transaction(r).map(|c| c.name.as_str()))
            .collect();
        let output = serde_json::json!({
            "metadata": statement.metadata,
            "header_index": statement.header_index,
            "transactions": statement.transactions,
            "keyword_hints": hints,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("📄 {}\n", input.display());

    if statement.metadata.is_empty() {
        println!("Account details: (none)");
    } else {
        println!("Account details:");
        for (key, value) in statement.metadata.iter() {
            println!("  {}: {}", key, value);
        }
    }
    println!();
    println!("Ledger header at row {}", statement.header_index + 1);
    println!();

    if statement.transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!(
        "{:<12} {:<40} {:<18} {:>12}  {}",
        "DATE", "DESCRIPTION", "TYPE", "AMOUNT", "HINT"
    );
    println!("{}", "-".repeat(100));

    let mut hinted = 0;
    for record in &statement.transactions {
        let hint = categories.match_transaction(record);
        if hint.is_some() {
            hinted += 1;
        }
        println!(
            "{:<12} {:<40} {:<18} {:>12}  {}",
            record.txn_date,
            truncate(&record.description, 40),
            record.direction().label(),
            record.amount(),
            hint.map(|c| c.name.as_str()).unwrap_or("-")
        );
    }

    println!();
    println!(
        "{} transactions, {} with a keyword hint",
        statement.transactions.len(),
        hinted
    );

    Ok(())
}
