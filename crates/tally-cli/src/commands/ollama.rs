//! Ollama-related command implementations

use anyhow::{Context, Result};
use tally_core::ai::{AIBackend, OllamaBackend};
use tally_core::models::TransactionRecord;
use tally_core::{Config, StatementPipeline};

use super::{load_categories, load_prompt};

/// Test Ollama connection and run sample categorizations
pub async fn cmd_ollama_test(config: &Config, description: Option<&str>) -> Result<()> {
    println!("🔍 Testing Ollama connection...\n");
    println!("  Host: {}", config.ollama.host);
    println!("  Model: {}", config.ollama.model);
    println!("  Timeout: {}s\n", config.ollama.timeout_secs);

    let client = OllamaBackend::from_config(&config.ollama);

    // Health check
    print!("Checking Ollama availability... ");
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        println!("\n⚠️  Could not connect to Ollama at {}", config.ollama.host);
        println!("\nTo set up Ollama:");
        println!("  1. Install Ollama: https://ollama.ai/download");
        println!("  2. Start the server: ollama serve");
        println!("  3. Pull the model: ollama pull {}", config.ollama.model);
        println!(
            "  4. Set environment variable: export OLLAMA_HOST={}",
            config.ollama.host
        );
        return Ok(());
    }

    match client.list_models().await {
        Ok(models) => {
            let installed = models.iter().any(|m| m == &config.ollama.model);
            println!("\n📦 {} models installed", models.len());
            if !installed {
                println!(
                    "   ⚠️  {} is not installed (ollama pull {})",
                    config.ollama.model, config.ollama.model
                );
            }
        }
        Err(e) => println!("\n❌ Could not list models: {}", e),
    }

    // Sample categorizations: (description, debit, credit)
    let samples: Vec<(String, &str, &str)> = match description {
        Some(d) => vec![(d.to_string(), "100.00", "")],
        None => vec![
            ("UPWORK ESCROW INC".to_string(), "", "45000.00"),
            ("UPI/ZOMATO/ORDER 1234".to_string(), "450.00", ""),
            ("NEFT TO J SMITH".to_string(), "2000.00", ""),
            ("AIRTEL PREPAID RECHARGE".to_string(), "299.00", ""),
        ],
    };

    let categories = load_categories(config, None)?;
    let prompt = load_prompt(config)?;
    let pipeline = StatementPipeline::new(&client, &categories, &prompt);

    println!("\n📋 Testing categorization...\n");
    for (description, debit, credit) in samples {
        let record = TransactionRecord {
            txn_date: "01/01/2024".to_string(),
            value_date: "01/01/2024".to_string(),
            description: description.clone(),
            ref_no: String::new(),
            debit: debit.to_string(),
            credit: credit.to_string(),
            balance: String::new(),
        };

        let annotated = pipeline.classify_record(&record).await;
        if annotated.failed {
            println!("  \"{}\" → ❌ {}", description, annotated.result.explanation);
        } else {
            println!(
                "  \"{}\" → {} ({})",
                description, annotated.result.category, annotated.result.explanation
            );
        }
    }

    println!("\n✅ Ollama test complete!");
    Ok(())
}

/// List models installed on the Ollama server
pub async fn cmd_ollama_models(config: &Config) -> Result<()> {
    let client = OllamaBackend::from_config(&config.ollama);
    let models = client
        .list_models()
        .await
        .with_context(|| format!("Failed to list models at {}", config.ollama.host))?;

    if models.is_empty() {
        println!("No models installed. Pull one with: ollama pull {}", config.ollama.model);
        return Ok(());
    }

    for model in models {
        let marker = if model == config.ollama.model { "*" } else { " " };
        println!("{} {}", marker, model);
    }
    Ok(())
}
