//! Category table command

use std::path::Path;

use anyhow::Result;
use tally_core::Config;

use super::load_categories;

/// Print the effective category table as JSON
pub fn cmd_categories(config: &Config, categories: Option<&Path>) -> Result<()> {
    let table = load_categories(config, categories)?;
    println!("{}", table.to_json()?);
    Ok(())
}
