//! Category table and keyword pre-classification
//!
//! A category table is an ordered list of categories, each with a set of
//! keywords and a remark describing what belongs in it. The keyword match is a
//! hint for the model prompt, never the final answer.
//!
//! Tables are loaded from JSON documents shaped like:
//!
//! ```json
//! {
//!   "Income": { "keywords": ["upwork", "paypal"], "remark": "Payments received" },
//!   "Food":   { "keywords": ["grocery", "zomato"], "remark": "Groceries, dining out" }
//! }
//! ```
//!
//! Document order is match priority.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::TransactionRecord;

/// One entry of a category table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub keywords: Vec<String>,
    pub remark: String,
}

/// Body of a category entry in a JSON table (the name is the object key)
#[derive(Debug, Serialize, Deserialize)]
struct CategoryRule {
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    remark: String,
}

/// Ordered category → keywords table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl CategoryTable {
    /// Create an empty table
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    /// Append a category. A category with the same name is replaced in place.
    pub fn push(&mut self, name: &str, keywords: &[&str], remark: &str) {
        let category = Category {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            remark: remark.to_string(),
        };
        match self.categories.iter_mut().find(|c| c.name == name) {
            Some(existing) => *existing = category,
            None => self.categories.push(category),
        }
    }

    /// Builder-style variant of [`push`](Self::push)
    pub fn with_category(mut self, name: &str, keywords: &[&str], remark: &str) -> Self {
        self.push(name, keywords, remark);
        self
    }

    /// Parse a JSON category document, keeping document order
    pub fn from_json(json: &str) -> Result<Self> {
        let map: Map<String, Value> = serde_json::from_str(json)?;
        if map.is_empty() {
            return Err(Error::InvalidData("Category table is empty".into()));
        }

        let mut categories = Vec::with_capacity(map.len());
        for (name, value) in map {
            let rule: CategoryRule = serde_json::from_value(value).map_err(|e| {
                Error::InvalidData(format!("Invalid category \"{}\": {}", name, e))
            })?;
            categories.push(Category {
                name,
                keywords: rule.keywords,
                remark: rule.remark,
            });
        }

        Ok(Self { categories })
    }

    /// Load a JSON category document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let table = Self::from_json(&content)?;
        debug!(
            "Loaded {} categories from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Serialize back to the JSON document shape accepted by [`from_json`](Self::from_json)
    pub fn to_json(&self) -> Result<String> {
        let mut map = Map::new();
        for category in &self.categories {
            let rule = CategoryRule {
                keywords: category.keywords.clone(),
                remark: category.remark.clone(),
            };
            map.insert(category.name.clone(), serde_json::to_value(rule)?);
        }
        Ok(serde_json::to_string_pretty(&Value::Object(map))?)
    }

    /// First category (in table order) with a keyword contained in the
    /// description, compared case-insensitively.
    ///
    /// Plain substring matching: "gas" also matches "VEGAS", and an empty
    /// keyword matches every description.
    pub fn match_description(&self, description: &str) -> Option<&Category> {
        let description = description.to_lowercase();
        self.categories.iter().find(|category| {
            category
                .keywords
                .iter()
                .any(|k| description.contains(&k.to_lowercase()))
        })
    }

    /// Keyword match on a transaction's description
    pub fn match_transaction(&self, record: &TransactionRecord) -> Option<&Category> {
        self.match_description(&record.description)
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Category names in priority order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for CategoryTable {
    /// Built-in table used when no category file is supplied
    fn default() -> Self {
        Self::empty()
            .with_category(
                "Income",
                &["upwork", "paypal", "dividend", "interest", "refund"],
                "Earnings, payments received, or other income (Credit transactions only)",
            )
            .with_category(
                "Housing",
                &["rent", "mortgage", "repair"],
                "Rent, mortgage, home repairs, etc.",
            )
            .with_category(
                "Transportation",
                &["fuel", "gas", "car", "bus", "train", "uber", "lyft", "ola"],
                "Fuel, car payments, public transport, etc.",
            )
            .with_category(
                "Food",
                &["grocery", "restaurant", "cafe", "food", "zomato", "swigy"],
                "Groceries, dining out, etc.",
            )
            .with_category(
                "Utilities",
                &[
                    "electricity",
                    "water",
                    "gas",
                    "internet",
                    "phone",
                    "jio",
                    "airtel",
                    "phone",
                ],
                "Electricity, water, gas, internet, phone bills, etc.",
            )
            .with_category(
                "Insurance",
                &["insurance", "policy"],
                "Health, car, home, life insurance, etc.",
            )
            .with_category(
                "Medical & Healthcare",
                &["doctor", "hospital", "pharmacy", "medicine"],
                "Doctor visits, medications, etc.",
            )
            .with_category(
                "Savings & Investments",
                &["savings", "investment", "stocks", "bonds"],
                "Deposits to savings accounts, investments, etc.",
            )
            .with_category(
                "Personal Spending",
                &["clothing", "entertainment", "personal"],
                "Clothing, entertainment, personal care, etc.",
            )
            .with_category(
                "Recreation & Entertainment",
                &["movie", "sport", "hobby", "game", "netflix"],
                "Movies, sports, hobbies, etc.",
            )
            .with_category("Investment", &["INDMoney"], "invest to stock or SIP")
            .with_category("business", &["AWS"], "Business expenses")
            .with_category("Tax", &["tax", "Income tax"], "TAX related expenses")
            .with_category(
                "Miscellaneous",
                &["random"],
                "rando small ammounts among friends",
            )
    }
}
