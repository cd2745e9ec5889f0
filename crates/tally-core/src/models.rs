//! Data models for statement rows, transactions and classification results

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Cells of one input line, exactly as read from the statement file
pub type RawRow = Vec<String>;

/// Number of columns in the ledger: date, value date, description, reference,
/// debit, credit, balance
pub const TRANSACTION_COLUMNS: usize = 7;

/// Category assigned when the model reply carries no `Category:` line
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Explanation assigned when the model reply carries no `Explanation:` line
pub const NO_EXPLANATION: &str = "No explanation provided";

/// Category recorded for rows whose classification call failed
pub const ERROR_CATEGORY: &str = "Error";

/// Key/value lines found above the transaction table
/// (e.g. "Account Number", "Start Date").
///
/// Keeps insertion order. Inserting an existing key replaces its value but
/// keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataBlock {
    entries: Vec<(String, String)>,
}

impl MetadataBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for MetadataBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Money direction derived from which of debit/credit is filled in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money out
    Debit,
    /// Money in
    Credit,
    /// Neither debit nor credit present
    Unknown,
}

impl Direction {
    /// Human-readable label used in prompts
    pub fn label(&self) -> &'static str {
        match self {
            Self::Debit => "Debit (Money Out)",
            Self::Credit => "Credit (Money In)",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One ledger row, trimmed to the seven known columns.
///
/// Amounts stay as text: number formatting differs between banks and the
/// description is the only field used for classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub txn_date: String,
    pub value_date: String,
    pub description: String,
    pub ref_no: String,
    pub debit: String,
    pub credit: String,
    pub balance: String,
}

impl TransactionRecord {
    pub fn direction(&self) -> Direction {
        if !self.debit.trim().is_empty() {
            Direction::Debit
        } else if !self.credit.trim().is_empty() {
            Direction::Credit
        } else {
            Direction::Unknown
        }
    }

    /// Amount of the transaction in its original formatting, "0" when neither
    /// debit nor credit is present
    pub fn amount(&self) -> &str {
        match self.direction() {
            Direction::Debit => self.debit.trim(),
            Direction::Credit => self.credit.trim(),
            Direction::Unknown => "0",
        }
    }
}

/// Category and explanation for a single transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: String,
    pub explanation: String,
}

impl Default for ClassificationResult {
    fn default() -> Self {
        Self {
            category: UNCATEGORIZED.to_string(),
            explanation: NO_EXPLANATION.to_string(),
        }
    }
}

impl ClassificationResult {
    pub fn new(category: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            explanation: explanation.into(),
        }
    }

    /// Result recorded for a row whose classification call failed
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(ERROR_CATEGORY, message)
    }

    /// Render in the same `Category:` / `Explanation:` shape the model is asked for
    pub fn render(&self) -> String {
        format!(
            "Category: {}\nExplanation: {}",
            self.category, self.explanation
        )
    }
}

/// A transaction together with the outcome of classifying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedTransaction {
    pub record: TransactionRecord,
    pub result: ClassificationResult,
    /// Category suggested by the keyword table, if any keyword matched
    pub keyword_match: Option<String>,
    /// The classification call itself failed; `result` carries the message
    pub failed: bool,
}
