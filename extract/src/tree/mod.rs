//! Structured-tree extraction over JSON values and XML element trees.
//!
//! Both walkers locate test-case-shaped nodes and build cases through the
//! shared [`case_from_bag`] helper, which probes an ordered alias list per
//! field against a key/attribute bag. Recursion is bounded by
//! [`MAX_TREE_DEPTH`]; deeper subtrees are skipped and counted in
//! [`TreeExtraction::depth_hits`].

mod json;
mod xml;

use casegen_core::{CaseField, TestCase};

pub use json::{JSON_CASE_KEYS, JSON_FIELD_ALIASES, extract_json_tree, json_scalar_text};
pub use xml::{XML_ATTRIBUTE_ALIASES, XML_CASE_TAGS, XmlElement, extract_xml_tree};

/// Deepest nesting level the walkers descend into.
pub const MAX_TREE_DEPTH: usize = 128;

/// Ordered accepted keys for each field.
pub type FieldAliases = [(CaseField, &'static [&'static str])];

/// Anything that answers key lookups: a JSON object, an XML attribute list.
pub trait FieldBag {
    /// Value stored under `key`, if present.
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Builds a case by taking, for each field, the first alias present in
/// `bag`. Fields without an alias entry stay empty.
pub fn case_from_bag(bag: &impl FieldBag, aliases: &FieldAliases) -> TestCase {
    let mut case = TestCase::default();
    for (field, keys) in aliases {
        if let Some(value) = keys.iter().find_map(|key| bag.lookup(key)) {
            case.set(*field, value);
        }
    }
    case
}

/// Result of walking one tree.
#[derive(Debug, Clone, Default)]
pub struct TreeExtraction {
    pub cases: Vec<TestCase>,
    /// Subtrees skipped because they were nested deeper than
    /// [`MAX_TREE_DEPTH`].
    pub depth_hits: usize,
    pub nodes_visited: usize,
}

impl TreeExtraction {
    pub(crate) fn keep(&mut self, case: TestCase) {
        if !case.is_empty() {
            self.cases.push(case);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    impl FieldBag for HashMap<&str, &str> {
        fn lookup(&self, key: &str) -> Option<String> {
            self.get(key).map(|v| v.to_string())
        }
    }

    #[test]
    fn test_first_alias_present_wins() {
        let bag: HashMap<&str, &str> = [("story", "S"), ("feature", "F")].into();
        let aliases: &FieldAliases = &[(CaseField::Requirement, &["requirement", "story", "feature"])];
        let case = case_from_bag(&bag, aliases);
        assert_eq!(case.requirement, "S");
        assert!(case.scenario.is_empty());
    }

    #[test]
    fn test_keep_discards_empty_cases() {
        let mut extraction = TreeExtraction::default();
        extraction.keep(TestCase::default());
        extraction.keep(TestCase::default().with(CaseField::Then, "ok"));
        assert_eq!(extraction.cases.len(), 1);
    }
}
