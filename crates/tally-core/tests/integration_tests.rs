//! Integration tests for tally-core
//!
//! These tests exercise the full read → locate → classify → write workflow.

use std::fs;

use tally_core::{
    ai::OllamaBackend,
    export::{output_file_name, statement_file_name},
    import::{read_rows, read_rows_from_path},
    parse_category_reply, parse_statement,
    pipeline::ANNOTATION_HEADER,
    test_utils::MockOllamaServer,
    AnnotationLayout, CategoryTable, CsvRowSink, Direction, Error, MemorySink, MockBackend,
    Prompt, PromptId, StatementPipeline,
};

/// Helper to create a statement export in the usual bank layout:
/// account details, the ledger, and a trailing summary line.
fn sample_statement() -> &'static str {
    r#"Account Name:,JOHN DOE
Account Number:,XXXX1234
Start Date:,01/04/2024
End Date: 30/04/2024
Txn Date,Value Date,Description,Ref No./Cheque No.,Debit,Credit,Balance
01/04/2024,01/04/2024,UPWORK ESCROW INC,TRF001,,45000.00,95000.00
03/04/2024,03/04/2024,"UPI/ZOMATO, BLR",UPI123,450.00,,94550.00
05/04/2024,05/04/2024,NEFT TO J SMITH,N0042,2000.00,,92550.00
07/04/2024,07/04/2024,FAIL_ME CHARGE,X1,10.00,,92540.00
Closing Balance,,,92540.00
"#
}

fn prompt() -> Prompt {
    Prompt::embedded(PromptId::CategorizeTransaction).unwrap()
}

// =============================================================================
// Statement Parsing
// =============================================================================

#[test]
fn test_parse_sample_statement() {
    let rows = read_rows(sample_statement().as_bytes()).unwrap();
    let parsed = parse_statement(&rows).unwrap();

    assert_eq!(parsed.header_index, 4);
    assert_eq!(parsed.metadata.get("Account Name"), Some("JOHN DOE"));
    assert_eq!(parsed.metadata.get("End Date"), Some("30/04/2024"));
    assert_eq!(parsed.transactions.len(), 4);

    let upwork = &parsed.transactions[0];
    assert_eq!(upwork.direction(), Direction::Credit);
    assert_eq!(upwork.amount(), "45000.00");
    assert_eq!(parsed.transactions[1].description, "UPI/ZOMATO, BLR");
    assert_eq!(parsed.transactions[1].direction(), Direction::Debit);

    assert_eq!(
        statement_file_name(&parsed.metadata),
        "processed_statement_01-04-2024_30-04-2024.csv"
    );
}

// =============================================================================
// Pipeline with Mock Backend
// =============================================================================

#[tokio::test]
async fn test_full_pipeline_with_mock_backend() {
    let rows = read_rows(sample_statement().as_bytes()).unwrap();
    let ai = MockBackend::new().failing_on("FAIL_ME");
    let categories = CategoryTable::default();
    let prompt = prompt();
    let pipeline = StatementPipeline::new(&ai, &categories, &prompt);

    let mut sink = MemorySink::new();
    let summary = pipeline.process(&rows, &mut sink).await.unwrap();

    assert_eq!(sink.rows.len(), rows.len());
    assert_eq!(summary.transactions, 4);
    assert_eq!(summary.failures, 1);
    assert_eq!(summary.passed_through, 1);
    assert_eq!(ai.call_count(), 4);

    let header = &sink.rows[4];
    assert_eq!(header.last().map(String::as_str), Some(ANNOTATION_HEADER));

    let outcome = |i: usize| parse_category_reply(sink.rows[i].last().unwrap());
    assert_eq!(outcome(5).category, "Income");
    assert_eq!(outcome(6).category, "Food");
    assert_eq!(outcome(7).category, "Miscellaneous");
    assert_eq!(outcome(8).category, "Error");

    // Summary line is untouched
    assert_eq!(sink.rows[9], vec!["Closing Balance", "", "", "92540.00"]);
}

#[tokio::test]
async fn test_missing_header_is_fatal() {
    let csv = "Account Name:,JOHN DOE\nDate,Narration,Amount\n01/04/2024,UPWORK,100\n";
    let rows = read_rows(csv.as_bytes()).unwrap();
    let ai = MockBackend::new();
    let categories = CategoryTable::default();
    let prompt = prompt();
    let pipeline = StatementPipeline::new(&ai, &categories, &prompt);

    let result = pipeline.process(&rows, &mut MemorySink::new()).await;
    assert!(matches!(result, Err(Error::TableNotFound)));
    assert_eq!(ai.call_count(), 0);
}

// =============================================================================
// Pipeline with Mock Ollama Server
// =============================================================================

#[tokio::test]
async fn test_full_pipeline_over_http() {
    let server = MockOllamaServer::start().await;
    let ai = OllamaBackend::new(&server.url(), "llama3.1:8b");
    let categories = CategoryTable::default();
    let prompt = prompt();
    let pipeline = StatementPipeline::new(&ai, &categories, &prompt);

    let rows = read_rows(sample_statement().as_bytes()).unwrap();
    let mut sink = CsvRowSink::new(Vec::new());
    let summary = pipeline.process(&rows, &mut sink).await.unwrap();
    assert_eq!(summary.failures, 1);
    assert_eq!(summary.classified, 3);
    assert_eq!(summary.keyword_matches, 2);

    // Read the written CSV back and check the annotations survived quoting
    let written = sink.into_inner().unwrap();
    let reread = read_rows(written.as_slice()).unwrap();
    assert_eq!(reread.len(), rows.len());

    let annotations: Vec<String> = reread
        .iter()
        .filter(|r| r.len() == 8 && r[0] != "Txn Date")
        .map(|r| parse_category_reply(&r[7]).category)
        .collect();
    assert_eq!(annotations, vec!["Income", "Food", "Personal Spending", "Error"]);

    let failure = reread
        .iter()
        .find(|r| r.get(2).map(String::as_str) == Some("FAIL_ME CHARGE"))
        .unwrap();
    let failed = parse_category_reply(&failure[7]);
    assert!(failed.explanation.contains("500"));
}

#[tokio::test]
async fn test_split_layout_to_file() {
    let server = MockOllamaServer::start().await;
    let ai = OllamaBackend::new(&server.url(), "llama3.1:8b");
    let categories = CategoryTable::default();
    let prompt = prompt();
    let pipeline =
        StatementPipeline::new(&ai, &categories, &prompt).with_layout(AnnotationLayout::Split);

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("april.csv");
    fs::write(&input, sample_statement()).unwrap();

    let rows = read_rows_from_path(&input).unwrap();
    let output = dir.path().join(output_file_name(&input));
    let file = fs::File::create(&output).unwrap();
    let mut sink = CsvRowSink::new(file);
    pipeline.process(&rows, &mut sink).await.unwrap();
    drop(sink);

    let reread = read_rows_from_path(&output).unwrap();
    let header = reread.iter().find(|r| r[0] == "Txn Date").unwrap();
    assert_eq!(&header[7..], &["AI Category", "AI Explanation"]);

    let zomato = reread
        .iter()
        .find(|r| r.get(3).map(String::as_str) == Some("UPI123"))
        .unwrap();
    assert_eq!(zomato[7], "Food");
    assert_eq!(zomato[8], "UPI/ZOMATO, BLR matches the Food keywords");
}

// =============================================================================
// Category Tables
// =============================================================================

#[tokio::test]
async fn test_custom_category_file_drives_suggestions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("categories.json");
    fs::write(
        &path,
        r#"{
            "Freelance": {"keywords": ["upwork"], "remark": "Client payouts"},
            "Eating Out": {"keywords": ["zomato", "swiggy"], "remark": "Delivery apps"}
        }"#,
    )
    .unwrap();
    let categories = CategoryTable::load(&path).unwrap();

    let ai = MockBackend::new();
    let prompt = prompt();
    let pipeline = StatementPipeline::new(&ai, &categories, &prompt);

    let rows = read_rows(sample_statement().as_bytes()).unwrap();
    let mut sink = MemorySink::new();
    pipeline.process(&rows, &mut sink).await.unwrap();

    assert_eq!(parse_category_reply(&sink.rows[5][7]).category, "Freelance");
    assert_eq!(parse_category_reply(&sink.rows[6][7]).category, "Eating Out");
}
