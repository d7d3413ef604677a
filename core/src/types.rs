//! Test-case type definitions.
//!
//! This module defines the normalized five-field record produced by every
//! extractor, the field identifiers used by templates, and the small enums
//! describing where a case set came from. The types are designed for
//! serialization with [`serde`] and round-trip through JSON and YAML.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Version of the case-set contract (semver).
///
/// Embedded in every [`CaseSet`](crate::CaseSet) to track compatibility of
/// exported files.
pub const CASE_CONTRACT_VERSION: &str = "1.0.0";

/// One of the five fields of a [`TestCase`].
///
/// The declaration order is the fixed field order
/// `requirement, scenario, given, when, then`. Template projection relies on
/// it: when several fields target the same column, the field declared last
/// wins.
///
/// Deserialization also accepts the legacy field keys
/// (`historia_requisito`, `teste`, `dado`, `quando`, `entao`).
///
/// # Examples
///
/// ```
/// use casegen_core::CaseField;
///
/// let field: CaseField = "dado".parse().unwrap();
/// assert_eq!(field, CaseField::Given);
/// assert_eq!(field.as_str(), "given");
/// assert!(CaseField::Requirement < CaseField::Then);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseField {
    /// Story, requirement or feature the case belongs to.
    #[serde(alias = "historia_requisito")]
    Requirement,
    /// Scenario or test title.
    #[serde(alias = "teste")]
    Scenario,
    /// Preconditions (Gherkin `Given` / `Dado`).
    #[serde(alias = "dado")]
    Given,
    /// Action (Gherkin `When` / `Quando`).
    #[serde(alias = "quando")]
    When,
    /// Expected outcome (Gherkin `Then` / `Então`).
    #[serde(alias = "entao")]
    Then,
}

impl CaseField {
    /// All fields in the fixed field order.
    pub const ALL: [CaseField; 5] = [
        CaseField::Requirement,
        CaseField::Scenario,
        CaseField::Given,
        CaseField::When,
        CaseField::Then,
    ];

    /// Returns the canonical snake_case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Requirement => "requirement",
            Self::Scenario => "scenario",
            Self::Given => "given",
            Self::When => "when",
            Self::Then => "then",
        }
    }

    /// Returns the legacy key used by older exports.
    pub const fn legacy_key(&self) -> &'static str {
        match self {
            Self::Requirement => "historia_requisito",
            Self::Scenario => "teste",
            Self::Given => "dado",
            Self::When => "quando",
            Self::Then => "entao",
        }
    }

    /// Whether the field holds a Gherkin step.
    pub const fn is_step(&self) -> bool {
        matches!(self, Self::Given | Self::When | Self::Then)
    }
}

impl fmt::Display for CaseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no [`CaseField`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown test-case field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for CaseField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        CaseField::ALL
            .into_iter()
            .find(|field| field.as_str() == lower || field.legacy_key() == lower)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// A normalized test case.
///
/// All five fields are free text and default to the empty string. A case
/// is *empty* when every field is empty or whitespace-only.
///
/// # Examples
///
/// ```
/// use casegen_core::{CaseField, TestCase};
///
/// let mut case = TestCase::default();
/// assert!(case.is_empty());
///
/// case.set(CaseField::Scenario, "Login with valid credentials");
/// assert_eq!(case.get(CaseField::Scenario), "Login with valid credentials");
/// assert_eq!(case.filled_fields(), 1);
/// assert!(!case.is_complete());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default, alias = "historia_requisito")]
    pub requirement: String,
    #[serde(default, alias = "teste")]
    pub scenario: String,
    #[serde(default, alias = "dado")]
    pub given: String,
    #[serde(default, alias = "quando")]
    pub when: String,
    #[serde(default, alias = "entao")]
    pub then: String,
}

impl TestCase {
    /// Creates a case with every field populated.
    pub fn new(
        requirement: impl Into<String>,
        scenario: impl Into<String>,
        given: impl Into<String>,
        when: impl Into<String>,
        then: impl Into<String>,
    ) -> Self {
        Self {
            requirement: requirement.into(),
            scenario: scenario.into(),
            given: given.into(),
            when: when.into(),
            then: then.into(),
        }
    }

    /// Returns the value of one field.
    pub fn get(&self, field: CaseField) -> &str {
        match field {
            CaseField::Requirement => &self.requirement,
            CaseField::Scenario => &self.scenario,
            CaseField::Given => &self.given,
            CaseField::When => &self.when,
            CaseField::Then => &self.then,
        }
    }

    /// Returns a mutable reference to one field.
    pub fn get_mut(&mut self, field: CaseField) -> &mut String {
        match field {
            CaseField::Requirement => &mut self.requirement,
            CaseField::Scenario => &mut self.scenario,
            CaseField::Given => &mut self.given,
            CaseField::When => &mut self.when,
            CaseField::Then => &mut self.then,
        }
    }

    /// Replaces the value of one field.
    pub fn set(&mut self, field: CaseField, value: impl Into<String>) {
        *self.get_mut(field) = value.into();
    }

    /// Builder-style variant of [`set`](Self::set).
    pub fn with(mut self, field: CaseField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Iterates over `(field, value)` pairs in the fixed field order.
    pub fn fields(&self) -> impl Iterator<Item = (CaseField, &str)> + '_ {
        CaseField::ALL
            .into_iter()
            .map(move |field| (field, self.get(field)))
    }

    /// Number of fields holding non-whitespace text.
    pub fn filled_fields(&self) -> usize {
        self.fields()
            .filter(|(_, value)| !value.trim().is_empty())
            .count()
    }

    /// `true` when every field is empty or whitespace-only.
    pub fn is_empty(&self) -> bool {
        self.filled_fields() == 0
    }

    /// `true` when all five fields hold text.
    pub fn is_complete(&self) -> bool {
        self.filled_fields() == CaseField::ALL.len()
    }

    /// Trims surrounding whitespace from every field in place.
    pub fn trim_fields(&mut self) {
        for field in CaseField::ALL {
            let value = self.get_mut(field);
            let trimmed = value.trim();
            if trimmed.len() != value.len() {
                *value = trimmed.to_string();
            }
        }
    }
}

/// Document format a case set was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Plain text (`.txt`, `.md`).
    Text,
    /// PDF converted to text.
    Pdf,
    /// Word document converted to text.
    Word,
    /// JSON tree.
    Json,
    /// XML element tree.
    Xml,
}

impl SourceFormat {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Pdf => "pdf",
            Self::Word => "word",
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    /// Whether documents of this format reach the line parser as text.
    pub const fn is_textual(&self) -> bool {
        matches!(self, Self::Text | Self::Pdf | Self::Word)
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The producer that generated a set of cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Producer {
    /// Keyword-driven line scanner over plain text.
    LineParser,
    /// Recursive walker over a JSON tree.
    JsonTree,
    /// Walker over an XML element tree.
    XmlTree,
    /// Paragraph-based synthesizer used when nothing else matched.
    Fallback,
}

impl Producer {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::LineParser => "line-parser",
            Self::JsonTree => "json-tree",
            Self::XmlTree => "xml-tree",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_field_order_matches_declaration() {
        let mut sorted = CaseField::ALL;
        sorted.sort();
        assert_eq!(sorted, CaseField::ALL);
    }

    #[test]
    fn test_case_field_parses_canonical_and_legacy_names() {
        assert_eq!("then".parse::<CaseField>(), Ok(CaseField::Then));
        assert_eq!("ENTAO".parse::<CaseField>(), Ok(CaseField::Then));
        assert_eq!(
            "historia_requisito".parse::<CaseField>(),
            Ok(CaseField::Requirement)
        );
        assert!("prioridade".parse::<CaseField>().is_err());
    }

    #[test]
    fn test_case_field_serde_accepts_legacy_alias() {
        let field: CaseField = serde_json::from_str("\"teste\"").unwrap();
        assert_eq!(field, CaseField::Scenario);
        assert_eq!(serde_json::to_string(&field).unwrap(), "\"scenario\"");
    }

    #[test]
    fn test_whitespace_only_case_is_empty() {
        let case = TestCase::new("  ", "\t", "", "\n", " ");
        assert!(case.is_empty());
        assert_eq!(case.filled_fields(), 0);
    }

    #[test]
    fn test_trim_fields() {
        let mut case = TestCase::new(" R ", "S", "given text ", "", " then");
        case.trim_fields();
        assert_eq!(case, TestCase::new("R", "S", "given text", "", "then"));
    }

    #[test]
    fn test_test_case_deserializes_legacy_keys_with_defaults() {
        let json = r#"{"historia_requisito": "R1", "dado": "G"}"#;
        let case: TestCase = serde_json::from_str(json).unwrap();
        assert_eq!(case.requirement, "R1");
        assert_eq!(case.given, "G");
        assert_eq!(case.when, "");
    }

    #[test]
    fn test_producer_serde_is_kebab_case() {
        let json = serde_json::to_string(&Producer::LineParser).unwrap();
        assert_eq!(json, "\"line-parser\"");
        assert_eq!(Producer::Fallback.to_string(), "fallback");
    }
}
