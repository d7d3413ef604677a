//! Recursive walker over JSON values.

use casegen_core::CaseField;
use serde_json::{Map, Value};
use tracing::warn;

use super::{FieldBag, MAX_TREE_DEPTH, TreeExtraction, case_from_bag};

/// Keys (compared case-insensitively) that mark an object as a test case.
pub const JSON_CASE_KEYS: [&str; 4] = ["test", "testcase", "scenario", "cenario"];

/// Accepted keys per field, probed in order.
pub static JSON_FIELD_ALIASES: [(CaseField, &[&str]); 5] = [
    (CaseField::Requirement, &["requirement", "story", "feature"]),
    (
        CaseField::Scenario,
        &["test", "testcase", "scenario", "cenario", "description"],
    ),
    (CaseField::Given, &["given", "precondition", "context"]),
    (CaseField::When, &["when", "action", "steps"]),
    (CaseField::Then, &["then", "expected", "result"]),
];

impl FieldBag for Map<String, Value> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.iter()
            .find(|(k, _)| k.to_lowercase() == key)
            .map(|(_, value)| json_scalar_text(value))
    }
}

/// Walks a JSON value and collects every test-case object.
///
/// An object carrying one of [`JSON_CASE_KEYS`] becomes one case and is not
/// descended into; any other object or array is walked member by member.
///
/// # Examples
///
/// ```
/// use casegen_extract::tree::extract_json_tree;
///
/// let value = serde_json::json!({"scenario": "S1", "given": "G", "then": "T"});
/// let extraction = extract_json_tree(&value);
/// assert_eq!(extraction.cases.len(), 1);
/// assert_eq!(extraction.cases[0].scenario, "S1");
/// assert_eq!(extraction.cases[0].when, "");
/// ```
pub fn extract_json_tree(root: &Value) -> TreeExtraction {
    let mut extraction = TreeExtraction::default();
    walk(root, 0, &mut extraction);
    if extraction.depth_hits > 0 {
        warn!(
            hits = extraction.depth_hits,
            max_depth = MAX_TREE_DEPTH,
            "JSON tree exceeded depth limit; deeper nodes skipped"
        );
    }
    extraction
}

fn walk(value: &Value, depth: usize, extraction: &mut TreeExtraction) {
    if depth > MAX_TREE_DEPTH {
        extraction.depth_hits += 1;
        return;
    }
    extraction.nodes_visited += 1;

    match value {
        Value::Object(map) if is_case_object(map) => {
            extraction.keep(case_from_bag(map, &JSON_FIELD_ALIASES));
        }
        Value::Object(map) => {
            for child in map.values() {
                walk(child, depth + 1, extraction);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, depth + 1, extraction);
            }
        }
        _ => {}
    }
}

fn is_case_object(map: &Map<String, Value>) -> bool {
    map.keys()
        .any(|key| JSON_CASE_KEYS.contains(&key.to_lowercase().as_str()))
}

/// Text form of a JSON value used as a field.
///
/// Strings are taken as-is, `null` becomes empty, arrays of scalars are
/// joined with spaces and anything else is rendered as compact JSON.
pub fn json_scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) if items.iter().all(is_scalar) => items
            .iter()
            .map(json_scalar_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        _ => value.to_string(),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_case_object() {
        let extraction = extract_json_tree(&json!({"scenario": "S1", "given": "G", "then": "T"}));
        let case = &extraction.cases[0];
        assert_eq!(extraction.cases.len(), 1);
        assert_eq!(
            (case.scenario.as_str(), case.given.as_str(), case.when.as_str(), case.then.as_str()),
            ("S1", "G", "", "T")
        );
    }

    #[test]
    fn test_nested_cases_in_document() {
        let value = json!({
            "suite": {
                "name": "checkout",
                "cases": [
                    {"Test": "pay by card", "story": "Payments", "steps": "submit"},
                    {"testcase": "pay by pix", "expected": "confirmed"}
                ]
            },
            "meta": {"owner": "qa"}
        });

        let extraction = extract_json_tree(&value);
        assert_eq!(extraction.cases.len(), 2);
        assert_eq!(extraction.cases[0].requirement, "Payments");
        assert_eq!(extraction.cases[0].scenario, "pay by card");
        assert_eq!(extraction.cases[0].when, "submit");
        assert_eq!(extraction.cases[1].then, "confirmed");
    }

    #[test]
    fn test_alias_priority() {
        let extraction = extract_json_tree(&json!({
            "scenario": "from scenario",
            "test": "from test",
            "context": "ctx",
            "precondition": "pre"
        }));
        assert_eq!(extraction.cases[0].scenario, "from test");
        assert_eq!(extraction.cases[0].given, "pre");
    }

    #[test]
    fn test_case_object_with_only_empty_fields_is_dropped_not_descended() {
        let extraction = extract_json_tree(&json!({
            "scenario": "",
            "children": [{"scenario": "inner"}]
        }));
        assert!(extraction.cases.is_empty());
    }

    #[test]
    fn test_non_string_values() {
        let extraction = extract_json_tree(&json!({
            "scenario": 42,
            "steps": ["open", "click", null],
            "result": {"code": 200},
            "given": null
        }));
        let case = &extraction.cases[0];
        assert_eq!(case.scenario, "42");
        assert_eq!(case.when, "open click");
        assert_eq!(case.then, r#"{"code":200}"#);
        assert_eq!(case.given, "");
    }

    #[test]
    fn test_scalar_root_yields_nothing() {
        assert!(extract_json_tree(&json!("just a string")).cases.is_empty());
        assert!(extract_json_tree(&json!([1, 2, 3])).cases.is_empty());
    }

    #[test]
    fn test_depth_guard() {
        let mut value = json!({"scenario": "deep"});
        for _ in 0..(MAX_TREE_DEPTH + 10) {
            value = json!([value]);
        }
        let extraction = extract_json_tree(&value);
        assert!(extraction.cases.is_empty());
        assert_eq!(extraction.depth_hits, 1);
    }
}
