use serde::{Deserialize, Serialize};

use crate::{Producer, SourceFormat, TestCase};

/// Serializable bundle of extracted cases with provenance metadata.
///
/// A case set is what the CLI writes when cases are exported as JSON or
/// YAML rather than projected through a template.
///
/// # Examples
///
/// ```
/// use casegen_core::*;
///
/// let mut set = CaseSet::new("2024-01-15T10:30:00Z");
/// set.source = Some("login.txt".into());
/// set.cases.push(TestCase::default().with(CaseField::Scenario, "Valid login"));
///
/// assert_eq!(set.case_count(), 1);
/// assert_eq!(set.schema_version.as_deref(), Some(CASE_CONTRACT_VERSION));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSet {
    /// Case contract version (populated from
    /// [`CASE_CONTRACT_VERSION`](crate::CASE_CONTRACT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Path or label of the source document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Detected document format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<SourceFormat>,
    /// Producer that generated the cases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<Producer>,
    /// ISO-8601 timestamp for set creation.
    pub generated_at: String,
    pub cases: Vec<TestCase>,
}

impl CaseSet {
    /// Creates an empty set stamped with the contract version.
    pub fn new(generated_at: impl Into<String>) -> Self {
        Self {
            schema_version: Some(crate::CASE_CONTRACT_VERSION.to_string()),
            source: None,
            format: None,
            producer: None,
            generated_at: generated_at.into(),
            cases: Vec::new(),
        }
    }

    /// Returns the number of cases in this set.
    pub fn case_count(&self) -> usize {
        self.cases.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_set_omits_absent_provenance() {
        let set = CaseSet::new("2026-01-01T00:00:00Z");
        let json = serde_json::to_string(&set).unwrap();
        assert!(!json.contains("\"source\""));
        assert!(!json.contains("\"producer\""));
        assert!(json.contains("\"schema_version\":\"1.0.0\""));
    }

    #[test]
    fn test_case_set_roundtrips_producer() {
        let mut set = CaseSet::new("2026-01-01T00:00:00Z");
        set.producer = Some(Producer::XmlTree);
        set.format = Some(SourceFormat::Xml);

        let json = serde_json::to_string(&set).unwrap();
        let back: CaseSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.producer, Some(Producer::XmlTree));
        assert_eq!(back.format, Some(SourceFormat::Xml));
    }
}
