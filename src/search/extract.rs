// src/search/extract.rs
//! Pulls JSON out of LLM free text. Model output is never trusted to be well-formed:
//! code fences are stripped, then the first bracketed (or braced) value that parses wins.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Outcome of scanning free text for structured data.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted<T> {
    Parsed(T),
    Unparsed(String),
}

impl<T> Extracted<T> {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Extracted::Parsed(_))
    }
}

static RE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```(?:json)?").expect("code fence regex"));

/// Remove every ```json / ``` marker and trim.
pub fn strip_code_fences(text: &str) -> String {
    RE_FENCE.replace_all(text, "").trim().to_string()
}

/// First JSON array in `text` that is empty or holds at least one object.
/// Citation markers like `[1]` are skipped. Blank text counts as an empty array.
pub fn extract_json_array(text: &str) -> Extracted<Vec<Value>> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return Extracted::Parsed(Vec::new());
    }
    let found = first_value(&cleaned, '[', |v| match v {
        Value::Array(items) if items.is_empty() || items.iter().any(Value::is_object) => {
            Some(items)
        }
        _ => None,
    });
    match found {
        Some(items) => Extracted::Parsed(items),
        None => Extracted::Unparsed(text.to_string()),
    }
}

/// First JSON object in `text`.
pub fn extract_json_object(text: &str) -> Extracted<Map<String, Value>> {
    let cleaned = strip_code_fences(text);
    let found = first_value(&cleaned, '{', |v| match v {
        Value::Object(map) => Some(map),
        _ => None,
    });
    match found {
        Some(map) => Extracted::Parsed(map),
        None => Extracted::Unparsed(text.to_string()),
    }
}

/// Try each `open` position in order; parse one value from there, ignoring trailing text.
fn first_value<T>(s: &str, open: char, accept: impl Fn(Value) -> Option<T>) -> Option<T> {
    for (idx, _) in s.match_indices(open) {
        let mut stream = serde_json::Deserializer::from_str(&s[idx..]).into_iter::<Value>();
        if let Some(Ok(v)) = stream.next() {
            if let Some(out) = accept(v) {
                return Some(out);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences_and_prose() {
        let text = "Here is what I found:\n```json\n[{\"url\":\"https://a.test/1\"}]\n```\nDone.";
        match extract_json_array(text) {
            Extracted::Parsed(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0]["url"], "https://a.test/1");
            }
            other => panic!("expected parsed, got {other:?}"),
        }
    }

    #[test]
    fn skips_citation_brackets() {
        let text = "Found reposts [1][2]: [{\"url\":\"https://b.test\"}] see [3]";
        let out = extract_json_array(text);
        assert!(matches!(out, Extracted::Parsed(ref v) if v.len() == 1));
    }

    #[test]
    fn empty_array_is_parsed() {
        assert_eq!(extract_json_array("[]"), Extracted::Parsed(vec![]));
        assert_eq!(extract_json_array("   "), Extracted::Parsed(vec![]));
    }

    #[test]
    fn broken_json_is_unparsed_with_raw_text() {
        let text = "I could not find any reposts. [{\"url\": ";
        assert_eq!(
            extract_json_array(text),
            Extracted::Unparsed(text.to_string())
        );
    }

    #[test]
    fn object_extraction_ignores_surrounding_text() {
        let text = "Summary: {\"description\":\"dog on skateboard\",\"keywords\":[\"dog\"]} thanks";
        match extract_json_object(text) {
            Extracted::Parsed(map) => assert_eq!(map["description"], "dog on skateboard"),
            other => panic!("expected parsed, got {other:?}"),
        }
        assert!(!extract_json_object("no braces here").is_parsed());
    }
}
