// src/review/normalizer.rs
// Turns raw model output into a non-empty list of typed suggestions.
// Handles JSON fenced in code blocks, bare JSON arrays, and free-form prose.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::types::Suggestion;

lazy_static! {
    // ```json ... ``` or ``` ... ``` around a single array, matching across newlines
    static ref FENCED_ARRAY: Regex =
        Regex::new(r"(?si)```(?:json)?\s*(\[.*?\])\s*```").expect("fenced-array pattern");
    // Leading/trailing fence markers on otherwise plain text
    static ref FENCE_EDGES: Regex =
        Regex::new(r"^```[A-Za-z0-9_-]*\n|\n```$").expect("fence-edge pattern");
}

/// Normalize a raw model response into suggestions. Never fails and never
/// returns an empty list: unusable output degrades to a synthetic entry.
///
/// Resolution order: fenced JSON array, then the whole text as a JSON
/// array, then the fence-stripped text wrapped as a single suggestion.
pub fn normalize_review(raw: &str) -> Vec<Suggestion> {
    let mut elements = extract_fenced_array(raw);

    if elements.is_empty() {
        elements = parse_whole_array(raw);
    }

    let mut suggestions: Vec<Suggestion> = if elements.is_empty() {
        vec![fallback_suggestion(raw)]
    } else {
        elements.into_iter().filter_map(normalize_element).collect()
    };

    // Every element may have been dropped as malformed; keep the contract
    if suggestions.is_empty() {
        suggestions.push(Suggestion::plain(
            "summary",
            1,
            "No issues found or model returned an empty list.",
        ));
    }

    suggestions
}

/// Lowercase and trim a severity label, mapping legacy synonyms onto the
/// canonical set. Unknown labels pass through unchanged.
pub fn normalize_severity(raw: &str) -> String {
    let severity = raw.trim().to_lowercase();
    match severity.as_str() {
        "warning" => "medium".to_string(),
        "error" => "high".to_string(),
        _ => severity,
    }
}

fn extract_fenced_array(raw: &str) -> Vec<Value> {
    let Some(captures) = FENCED_ARRAY.captures(raw) else {
        return Vec::new();
    };
    let Some(json) = captures.get(1) else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<Value>>(json.as_str()) {
        Ok(items) => items,
        Err(e) => {
            debug!("Failed to parse fenced JSON: {}", e);
            Vec::new()
        }
    }
}

fn parse_whole_array(raw: &str) -> Vec<Value> {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            debug!("Whole-text parse produced a non-array value");
            Vec::new()
        }
        Err(e) => {
            debug!("Whole-text JSON parse failed: {}", e);
            Vec::new()
        }
    }
}

/// Wrap the fence-stripped raw text into a single suggestion.
fn fallback_suggestion(raw: &str) -> Suggestion {
    let cleaned = FENCE_EDGES.replace_all(raw.trim(), "").trim().to_string();
    let comment = if cleaned.is_empty() {
        "No response text returned by the model.".to_string()
    } else {
        cleaned
    };
    Suggestion::plain("response.txt", 1, comment)
}

/// Convert one parsed element into a typed suggestion. Elements that are
/// not well-formed mappings are dropped. A present severity is normalized;
/// an absent one stays absent.
fn normalize_element(mut value: Value) -> Option<Suggestion> {
    let map = value.as_object_mut()?;

    let severity = match map.remove("severity") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(normalize_severity(&s)),
        Some(other) => Some(normalize_severity(&other.to_string())),
    };

    let mut suggestion: Suggestion = serde_json::from_value(value).ok()?;
    suggestion.severity = severity;
    suggestion.line_number = suggestion.line_number.max(1);
    Some(suggestion)
}
