//! Parsing helpers for classification replies
//!
//! Models are asked to answer with a `Category:` line and an `Explanation:`
//! line, but replies often include extra chatter or ignore the format
//! entirely. Parsing never fails: anything unrecognized degrades to the
//! sentinel category with the raw reply as explanation.

use crate::models::ClassificationResult;

const CATEGORY_PREFIX: &str = "category:";
const EXPLANATION_PREFIX: &str = "explanation:";

/// Extract a category/explanation pair from a free-text reply.
///
/// Lines are trimmed and matched case-insensitively. When a field appears more
/// than once, the last occurrence wins. If neither field is found, the whole
/// trimmed reply becomes the explanation.
pub fn parse_category_reply(reply: &str) -> ClassificationResult {
    let mut result = ClassificationResult::default();
    let mut found_category = false;
    let mut found_explanation = false;

    for line in reply.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(value) = field_value(line, CATEGORY_PREFIX) {
            result.category = value;
            found_category = true;
        } else if let Some(value) = field_value(line, EXPLANATION_PREFIX) {
            result.explanation = value;
            found_explanation = true;
        }
    }

    if !found_category && !found_explanation {
        result.explanation = reply.trim().to_string();
    }

    result
}

/// Value after the first colon when `line` starts with `prefix` (ASCII
/// case-insensitive)
fn field_value(line: &str, prefix: &str) -> Option<String> {
    let head = line.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    line.split_once(':').map(|(_, value)| value.trim().to_string())
}
