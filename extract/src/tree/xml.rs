//! XML element trees and the test-case walker over them.

use casegen_core::{CaseField, TestCase};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{FieldBag, MAX_TREE_DEPTH, TreeExtraction, case_from_bag};
use crate::parser::step_opener;

/// Element names treated as dedicated test cases (case-sensitive).
pub const XML_CASE_TAGS: [&str; 3] = ["testcase", "test", "scenario"];

/// Attribute aliases. The scenario falls back to the tag name.
pub static XML_ATTRIBUTE_ALIASES: [(CaseField, &[&str]); 2] = [
    (CaseField::Requirement, &["requirement", "story"]),
    (CaseField::Scenario, &["name", "title"]),
];

/// Owned XML element: tag, attributes in document order, the text before
/// the first child element, and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlElement {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Value of the first attribute named `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Parses an XML document into its root element.
    ///
    /// Elements nested deeper than [`MAX_TREE_DEPTH`] are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use casegen_extract::tree::XmlElement;
    ///
    /// let root = XmlElement::parse(r#"<suite><testcase name="a">Dado x</testcase></suite>"#).unwrap();
    /// assert_eq!(root.tag, "suite");
    /// assert_eq!(root.children[0].attribute("name"), Some("a"));
    /// ```
    pub fn parse(xml: &str) -> Result<Self, roxmltree::Error> {
        let document = roxmltree::Document::parse(xml)?;
        let mut dropped = 0;
        let root = Self::from_node(document.root_element(), 0, &mut dropped);
        if dropped > 0 {
            warn!(dropped, max_depth = MAX_TREE_DEPTH, "XML elements beyond depth limit dropped");
        }
        Ok(root)
    }

    fn from_node(node: roxmltree::Node<'_, '_>, depth: usize, dropped: &mut usize) -> Self {
        let mut element = Self::new(node.tag_name().name());
        element.attributes = node
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect();

        for child in node.children() {
            if child.is_text() {
                if element.children.is_empty() {
                    element.text.push_str(child.text().unwrap_or_default());
                }
            } else if child.is_element() {
                if depth + 1 > MAX_TREE_DEPTH {
                    *dropped += 1;
                    continue;
                }
                element.children.push(Self::from_node(child, depth + 1, dropped));
            }
        }
        element
    }

    /// Own text followed by each child's own text, space-separated.
    pub fn gathered_text(&self) -> String {
        let mut text = self.text.trim().to_string();
        for child in &self.children {
            if !child.text.is_empty() {
                text.push(' ');
                text.push_str(&child.text);
            }
        }
        text
    }

    /// Serializes the element back to compact XML with escaped text.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push_str(&format!(" {name}=\"{}\"", escape_xml(value)));
        }
        if self.text.is_empty() && self.children.is_empty() {
            out.push_str(" />");
            return;
        }
        out.push('>');
        out.push_str(&escape_xml(&self.text));
        for child in &self.children {
            child.write_xml(out);
        }
        out.push_str(&format!("</{}>", self.tag));
    }
}

impl FieldBag for XmlElement {
    fn lookup(&self, key: &str) -> Option<String> {
        self.attribute(key).map(str::to_string)
    }
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Walks an element tree and collects test cases.
///
/// Descendants named in [`XML_CASE_TAGS`] are used when present: every
/// `testcase`, then every `test`, then every `scenario`, each group in
/// document order. Otherwise every element, the root included, is a
/// candidate case.
///
/// # Examples
///
/// ```
/// use casegen_extract::tree::{XmlElement, extract_xml_tree};
///
/// let root = XmlElement::parse(
///     r#"<suite><testcase name="Login" story="Auth">Dado um usuário. Quando entra. Então vê o painel.</testcase></suite>"#,
/// ).unwrap();
/// let extraction = extract_xml_tree(&root);
/// let case = &extraction.cases[0];
/// assert_eq!(case.requirement, "Auth");
/// assert_eq!(case.scenario, "Login");
/// assert_eq!(case.when, "Quando entra");
/// ```
pub fn extract_xml_tree(root: &XmlElement) -> TreeExtraction {
    let mut extraction = TreeExtraction::default();

    let mut search = TreeExtraction::default();
    let mut by_tag: [Vec<&XmlElement>; XML_CASE_TAGS.len()] = Default::default();
    for child in &root.children {
        collect_dedicated(child, 1, &mut by_tag, &mut search);
    }
    let dedicated: Vec<&XmlElement> = by_tag.into_iter().flatten().collect();

    if dedicated.is_empty() {
        debug!("No dedicated test elements, walking every element");
        walk_all(root, 0, &mut extraction);
    } else {
        debug!(elements = dedicated.len(), "Found dedicated test elements");
        extraction.depth_hits = search.depth_hits;
        extraction.nodes_visited = search.nodes_visited + 1;
        for element in dedicated {
            extraction.keep(case_from_element(element));
        }
    }

    if extraction.depth_hits > 0 {
        warn!(
            hits = extraction.depth_hits,
            max_depth = MAX_TREE_DEPTH,
            "XML tree exceeded depth limit; deeper elements skipped"
        );
    }
    extraction
}

fn collect_dedicated<'a>(
    element: &'a XmlElement,
    depth: usize,
    found: &mut [Vec<&'a XmlElement>; XML_CASE_TAGS.len()],
    search: &mut TreeExtraction,
) {
    if depth > MAX_TREE_DEPTH {
        search.depth_hits += 1;
        return;
    }
    search.nodes_visited += 1;
    if let Some(slot) = XML_CASE_TAGS.iter().position(|tag| *tag == element.tag) {
        found[slot].push(element);
    }
    for child in &element.children {
        collect_dedicated(child, depth + 1, found, search);
    }
}

fn walk_all(element: &XmlElement, depth: usize, extraction: &mut TreeExtraction) {
    if depth > MAX_TREE_DEPTH {
        extraction.depth_hits += 1;
        return;
    }
    extraction.nodes_visited += 1;
    extraction.keep(case_from_element(element));
    for child in &element.children {
        walk_all(child, depth + 1, extraction);
    }
}

/// Builds one case from an element's attributes and gathered text.
///
/// The text is split into sentences on `.`, `!` and `?`; each sentence that
/// opens with a Gherkin keyword is stored in that step field, the last one
/// winning.
pub fn case_from_element(element: &XmlElement) -> TestCase {
    let mut case = case_from_bag(element, &XML_ATTRIBUTE_ALIASES);
    if case.scenario.is_empty() {
        case.scenario = element.tag.clone();
    }

    let text = element.gathered_text();
    for sentence in text.split(['.', '!', '?']) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }
        if let Some(field) = step_opener(&sentence.to_lowercase()) {
            case.set(field, sentence);
        }
    }
    case
}
