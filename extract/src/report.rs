//! Structured reporting for extraction runs.

use casegen_core::{Producer, SourceFormat, TestCase};
use serde::{Deserialize, Serialize};

use crate::parser::ParseDiagnostics;

/// How one document was turned into cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Path or label of the source document, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub format: SourceFormat,
    /// Producer whose output was kept.
    pub producer: Producer,
    pub case_count: usize,
    pub fallback_used: bool,
    /// Line statistics; present when the line parser ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<ParseDiagnostics>,
    /// Recognized share of non-blank lines, `0.0` for tree inputs.
    pub coverage: f64,
    pub nodes_visited: usize,
    pub depth_hits: usize,
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    pub fn new(format: SourceFormat, producer: Producer) -> Self {
        Self {
            source: None,
            format,
            producer,
            case_count: 0,
            fallback_used: false,
            lines: None,
            coverage: 0.0,
            nodes_visited: 0,
            depth_hits: 0,
            warnings: Vec::new(),
        }
    }
}

/// Cases produced from one document together with their report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRun {
    pub cases: Vec<TestCase>,
    pub report: ExtractionReport,
}

impl ExtractionRun {
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
