//! Statement annotation pipeline
//!
//! Walks a statement row by row: account details and the ledger header are
//! re-emitted first, then every ledger row is either passed through (too short
//! to be a transaction) or classified and written with its annotation
//! appended. A failed classification never aborts the file.

use tracing::{debug, info, warn};

use crate::ai::{parse_category_reply, AIBackend};
use crate::categories::CategoryTable;
use crate::error::Result;
use crate::export::RowSink;
use crate::models::{AnnotatedTransaction, ClassificationResult, RawRow, TransactionRecord};
use crate::prompts::{render_categorization, Prompt};
use crate::statement::{locate_table, normalize_row};

/// Header label for the combined annotation column
pub const ANNOTATION_HEADER: &str = "AI Category and Explanation";
/// Header label for the category column in split layout
pub const CATEGORY_HEADER: &str = "AI Category";
/// Header label for the explanation column in split layout
pub const EXPLANATION_HEADER: &str = "AI Explanation";

/// Progress callback for classification
/// Parameters: (current, total)
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// How the classification result is appended to a ledger row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnnotationLayout {
    /// One cell: `Category: ...\nExplanation: ...`
    #[default]
    Combined,
    /// Two cells: category, explanation
    Split,
}

impl AnnotationLayout {
    fn header_cells(&self) -> Vec<String> {
        match self {
            AnnotationLayout::Combined => vec![ANNOTATION_HEADER.to_string()],
            AnnotationLayout::Split => {
                vec![CATEGORY_HEADER.to_string(), EXPLANATION_HEADER.to_string()]
            }
        }
    }

    fn cells(&self, result: &ClassificationResult) -> Vec<String> {
        match self {
            AnnotationLayout::Combined => vec![result.render()],
            AnnotationLayout::Split => vec![result.category.clone(), result.explanation.clone()],
        }
    }
}

/// Counts from one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    /// Every row written to the sink, including account details and header
    pub rows_written: usize,
    /// Ledger rows that were sent for classification
    pub transactions: usize,
    /// Transactions with a usable classification
    pub classified: usize,
    /// Transactions whose description matched a category keyword
    pub keyword_matches: usize,
    /// Transactions whose classification call failed
    pub failures: usize,
    /// Ledger rows written unchanged
    pub passed_through: usize,
}

/// Annotates one statement at a time against a category table
pub struct StatementPipeline<'a, B: AIBackend> {
    ai: &'a B,
    categories: &'a CategoryTable,
    prompt: &'a Prompt,
    layout: AnnotationLayout,
    progress: Option<ProgressCallback>,
}

impl<'a, B: AIBackend> StatementPipeline<'a, B> {
    pub fn new(ai: &'a B, categories: &'a CategoryTable, prompt: &'a Prompt) -> Self {
        Self {
            ai,
            categories,
            prompt,
            layout: AnnotationLayout::default(),
            progress: None,
        }
    }

    pub fn with_layout(mut self, layout: AnnotationLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Annotate `rows` and write the result to `sink` in input order.
    ///
    /// Fails with `Error::TableNotFound` before anything is written when the
    /// ledger header is missing. Sink errors abort the run.
    pub async fn process(&self, rows: &[RawRow], sink: &mut impl RowSink) -> Result<ProcessSummary> {
        let header_index = locate_table(rows)?;
        let mut summary = ProcessSummary::default();

        for row in &rows[..header_index] {
            sink.write_row(row)?;
            summary.rows_written += 1;
        }

        let mut header = rows[header_index].clone();
        header.extend(self.layout.header_cells());
        sink.write_row(&header)?;
        summary.rows_written += 1;

        let ledger = &rows[header_index + 1..];
        let total = ledger.iter().filter(|r| normalize_row(r).is_some()).count();
        info!(
            "Classifying {} transactions with {} at {}",
            total,
            self.ai.model(),
            self.ai.host()
        );

        for row in ledger {
            let Some(record) = normalize_row(row) else {
                sink.write_row(row)?;
                summary.rows_written += 1;
                summary.passed_through += 1;
                continue;
            };

            summary.transactions += 1;
            if let Some(cb) = &self.progress {
                cb(summary.transactions, total);
            }

            let annotated = self.classify_record(&record).await;
            if annotated.keyword_match.is_some() {
                summary.keyword_matches += 1;
            }
            if annotated.failed {
                summary.failures += 1;
            } else {
                summary.classified += 1;
            }

            let mut out = row.clone();
            out.extend(self.layout.cells(&annotated.result));
            sink.write_row(&out)?;
            summary.rows_written += 1;
        }

        info!(
            "Processed {} transactions ({} failed, {} rows passed through)",
            summary.transactions, summary.failures, summary.passed_through
        );
        Ok(summary)
    }

    /// Classify one transaction.
    ///
    /// Backend failures become an `Error` category result carrying the message.
    pub async fn classify_record(&self, record: &TransactionRecord) -> AnnotatedTransaction {
        let hint = self.categories.match_transaction(record);
        let prompt = render_categorization(self.prompt, record, hint, self.categories);
        debug!("Classifying '{}'", record.description);

        let (result, failed) = match self.ai.classify(&prompt).await {
            Ok(reply) => {
                debug!("Raw reply for '{}': {}", record.description, reply);
                (parse_category_reply(&reply), false)
            }
            Err(e) => {
                warn!("Classification failed for '{}': {}", record.description, e);
                (ClassificationResult::failed(e.to_string()), true)
            }
        };

        AnnotatedTransaction {
            record: record.clone(),
            result,
            keyword_match: hint.map(|c| c.name.clone()),
            failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::error::Error;
    use crate::export::MemorySink;
    use crate::models::ERROR_CATEGORY;
    use crate::prompts::PromptId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn row(cells: &[&str]) -> RawRow {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn header() -> RawRow {
        row(&[
            "Txn Date",
            "Value Date",
            "Description",
            "Ref No./Cheque No.",
            "Debit",
            "Credit",
            "Balance",
        ])
    }

    fn txn(description: &str, debit: &str, credit: &str) -> RawRow {
        row(&["1/1", "1/1", description, "R1", debit, credit, "500"])
    }

    fn prompt() -> Prompt {
        Prompt::embedded(PromptId::CategorizeTransaction).unwrap()
    }

    #[tokio::test]
    async fn test_annotates_income_row() {
        let ai = MockBackend::new();
        let categories = CategoryTable::default();
        let prompt = prompt();
        let pipeline = StatementPipeline::new(&ai, &categories, &prompt);

        let rows = vec![
            row(&["Account:", "123"]),
            header(),
            txn("UPWORK PAYMENT", "", "100"),
        ];
        let mut sink = MemorySink::new();
        let summary = pipeline.process(&rows, &mut sink).await.unwrap();

        assert_eq!(sink.rows.len(), 3);
        assert_eq!(sink.rows[0], row(&["Account:", "123"]));
        assert_eq!(sink.rows[1].last().unwrap(), ANNOTATION_HEADER);
        assert_eq!(sink.rows[1].len(), 8);

        let annotation = sink.rows[2].last().unwrap();
        assert!(annotation.starts_with("Category: Income\nExplanation: "));
        assert_eq!(
            summary,
            ProcessSummary {
                rows_written: 3,
                transactions: 1,
                classified: 1,
                keyword_matches: 1,
                failures: 0,
                passed_through: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_short_rows_pass_through() {
        let ai = MockBackend::new();
        let categories = CategoryTable::default();
        let prompt = prompt();
        let pipeline = StatementPipeline::new(&ai, &categories, &prompt);

        let short = row(&["Closing Balance", "", "", "500"]);
        let rows = vec![header(), short.clone(), row(&[])];
        let mut sink = MemorySink::new();
        let summary = pipeline.process(&rows, &mut sink).await.unwrap();

        assert_eq!(sink.rows[1], short);
        assert_eq!(sink.rows[2], Vec::<String>::new());
        assert_eq!(summary.passed_through, 2);
        assert_eq!(summary.transactions, 0);
        assert_eq!(ai.call_count(), 0);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_file() {
        let ai = MockBackend::new().failing_on("broken");
        let categories = CategoryTable::default();
        let prompt = prompt();
        let pipeline = StatementPipeline::new(&ai, &categories, &prompt);

        let rows = vec![
            header(),
            txn("ZOMATO ORDER", "250", ""),
            txn("BROKEN MERCHANT", "10", ""),
            txn("NEFT TO J SMITH", "99", ""),
        ];
        let mut sink = MemorySink::new();
        let summary = pipeline.process(&rows, &mut sink).await.unwrap();

        assert_eq!(sink.rows.len(), 4);
        let categories: Vec<String> = sink.rows[1..]
            .iter()
            .map(|r| parse_category_reply(r.last().unwrap()).category)
            .collect();
        assert_ne!(categories[0], ERROR_CATEGORY);
        assert_eq!(categories[1], ERROR_CATEGORY);
        assert_ne!(categories[2], ERROR_CATEGORY);
        assert!(sink.rows[2].last().unwrap().contains("mock failure"));
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.classified, 2);
    }

    #[tokio::test]
    async fn test_error_category_reply_is_not_a_failure() {
        let ai = MockBackend::new().replying(
            "fee",
            "Category: Error\nExplanation: looks like a bank error fee",
        );
        let categories = CategoryTable::default();
        let prompt = prompt();
        let pipeline = StatementPipeline::new(&ai, &categories, &prompt);

        let rows = vec![header(), txn("ERROR CORRECTION FEE", "5", "")];
        let mut sink = MemorySink::new();
        let summary = pipeline.process(&rows, &mut sink).await.unwrap();

        assert_eq!(summary.failures, 0);
        assert_eq!(summary.classified, 1);
        let annotation = parse_category_reply(sink.rows[1].last().unwrap());
        assert_eq!(annotation.category, ERROR_CATEGORY);
        assert_eq!(annotation.explanation, "looks like a bank error fee");
    }

    #[tokio::test]
    async fn test_row_count_preserved() {
        let ai = MockBackend::new();
        let categories = CategoryTable::default();
        let prompt = prompt();
        let pipeline = StatementPipeline::new(&ai, &categories, &prompt);

        let rows = vec![
            row(&["Account Name:", "JOHN"]),
            row(&["Start Date:", "01/04/2024"]),
            row(&["Statement"]),
            header(),
            txn("SWIGGY", "120", ""),
            row(&["", "", "", "", "", "", ""]),
            row(&["Total"]),
            txn("SALARY APRIL", "", "50000"),
        ];
        let mut sink = MemorySink::new();
        let summary = pipeline.process(&rows, &mut sink).await.unwrap();

        assert_eq!(sink.rows.len(), rows.len());
        assert_eq!(summary.rows_written, rows.len());
        for (input, output) in rows.iter().zip(&sink.rows) {
            assert_eq!(&output[..input.len()], &input[..]);
        }
    }

    #[tokio::test]
    async fn test_missing_header_writes_nothing() {
        let ai = MockBackend::new();
        let categories = CategoryTable::default();
        let prompt = prompt();
        let pipeline = StatementPipeline::new(&ai, &categories, &prompt);

        let rows = vec![row(&["Account:", "123"]), txn("UPWORK", "", "1")];
        let mut sink = MemorySink::new();
        let err = pipeline.process(&rows, &mut sink).await.unwrap_err();

        assert!(matches!(err, Error::TableNotFound));
        assert!(sink.rows.is_empty());
    }

    #[tokio::test]
    async fn test_split_layout() {
        let ai = MockBackend::new().replying("zomato", "Category: Food\nExplanation: Takeaway");
        let categories = CategoryTable::default();
        let prompt = prompt();
        let pipeline =
            StatementPipeline::new(&ai, &categories, &prompt).with_layout(AnnotationLayout::Split);

        let rows = vec![header(), txn("ZOMATO ORDER", "250", "")];
        let mut sink = MemorySink::new();
        pipeline.process(&rows, &mut sink).await.unwrap();

        assert_eq!(&sink.rows[0][7..], &[CATEGORY_HEADER, EXPLANATION_HEADER]);
        assert_eq!(&sink.rows[1][7..], &["Food", "Takeaway"]);
    }

    #[tokio::test]
    async fn test_free_text_reply_is_uncategorized() {
        let ai = MockBackend::new().replying("cafe", "I think this is food");
        let categories = CategoryTable::empty().with_category("Food", &["grocery"], "");
        let prompt = prompt();
        let pipeline = StatementPipeline::new(&ai, &categories, &prompt);

        let record = normalize_row(&txn("BLUE CAFE", "80", "")).unwrap();
        let annotated = pipeline.classify_record(&record).await;

        assert_eq!(annotated.result.category, "Uncategorized");
        assert_eq!(annotated.result.explanation, "I think this is food");
        assert!(annotated.keyword_match.is_none());
        assert!(!annotated.failed);
    }

    #[tokio::test]
    async fn test_progress_callback() {
        let ai = MockBackend::new();
        let categories = CategoryTable::default();
        let prompt = prompt();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_cb = seen.clone();
        let pipeline = StatementPipeline::new(&ai, &categories, &prompt).with_progress(Box::new(
            move |current, total| {
                assert_eq!(total, 2);
                seen_cb.store(current, Ordering::SeqCst);
            },
        ));

        let rows = vec![header(), txn("A", "1", ""), row(&["x"]), txn("B", "2", "")];
        pipeline.process(&rows, &mut MemorySink::new()).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
