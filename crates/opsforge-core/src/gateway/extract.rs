//! Best-effort JSON extraction from model text.
//!
//! Models are asked for bare JSON but routinely wrap it in prose or code
//! fences. The extraction rule is fixed by contract: take the substring
//! between the first `{` and the last `}` and try to parse it as an
//! object. Anything unparseable yields `None`, which callers treat as a
//! degraded (not failed) reply.

use serde_json::{Map, Value};

/// Extract the JSON object embedded in `raw`, if any.
pub fn extract_json(raw: &str) -> Option<Map<String, Value>> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Required keys absent from `data` or present only as placeholders.
pub fn missing_keys<'a>(data: &Map<String, Value>, required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .filter(|key| !data.contains_key(**key))
        .copied()
        .collect()
}

/// Whether a value is a placeholder rather than real content.
///
/// Used by confidence scoring: null, empty strings, and the conventional
/// "unknown"/"n/a" markers count as absent.
pub fn is_placeholder(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            let s = s.trim();
            s.is_empty() || s.eq_ignore_ascii_case("unknown") || s.eq_ignore_ascii_case("n/a")
        }
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bare_object() {
        let data = extract_json(r#"{"severity": "P1"}"#).unwrap();
        assert_eq!(data["severity"], "P1");
    }

    #[test]
    fn test_extract_with_surrounding_prose() {
        let raw = "Here is the classification:\n{\"severity\": \"P2\"}\nLet me know!";
        let data = extract_json(raw).unwrap();
        assert_eq!(data["severity"], "P2");
    }

    #[test]
    fn test_extract_nested_object() {
        let raw = r#"{"plan": {"severity": "P1", "steps": [1, 2]}}"#;
        let data = extract_json(raw).unwrap();
        assert_eq!(data["plan"]["severity"], "P1");
    }

    #[test]
    fn test_extract_no_braces() {
        assert!(extract_json("I cannot answer that.").is_none());
    }

    #[test]
    fn test_extract_reversed_braces() {
        assert!(extract_json("} nonsense {").is_none());
    }

    #[test]
    fn test_extract_malformed_json() {
        assert!(extract_json("{severity: P1,}").is_none());
    }

    #[test]
    fn test_extract_top_level_array_rejected() {
        // First-{/last-} slice of an array of objects is not an object.
        assert!(extract_json(r#"[{"a": 1}, {"b": 2}]"#).is_none());
    }

    #[test]
    fn test_missing_keys() {
        let data = extract_json(r#"{"severity": "P1"}"#).unwrap();
        assert_eq!(missing_keys(&data, &["severity", "category"]), vec!["category"]);
        assert!(missing_keys(&data, &["severity"]).is_empty());
    }

    #[test]
    fn test_is_placeholder() {
        assert!(is_placeholder(&Value::Null));
        assert!(is_placeholder(&serde_json::json!("")));
        assert!(is_placeholder(&serde_json::json!("  unknown ")));
        assert!(is_placeholder(&serde_json::json!("N/A")));
        assert!(is_placeholder(&serde_json::json!([])));
        assert!(!is_placeholder(&serde_json::json!("P1")));
        assert!(!is_placeholder(&serde_json::json!(0)));
        assert!(!is_placeholder(&serde_json::json!(false)));
    }
}
