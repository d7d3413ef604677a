//! Extraction and normalization engine for Gherkin-style test cases.
//!
//! This crate recovers [`TestCase`] records from documents that were never
//! meant to be machine-readable: prose requirement documents, JSON exports
//! and XML test suites. Every input yields a best-effort result; malformed
//! content degrades to paragraph-based fallback cases instead of failing.
//!
//! # Main entry points
//!
//! - [`extract_text`] — keyword-driven line parsing of plain text.
//! - [`extract_json`] / [`extract_xml`] — structured-tree extraction.
//! - [`extract`] — dispatch on a loaded [`Document`].
//! - [`session::Session`] — the working set: preview, edit, render, export
//!   and quality analysis against a caller-owned template registry.
//!
//! # Example
//!
//! ```
//! use casegen_core::Producer;
//! use casegen_extract::extract_text;
//!
//! let text = "\
//! Historia/Requisito: Login
//! Cenário: usuário válido
//! Dado que o usuário está cadastrado
//! Quando: informa a senha correta
//! Então acessa o painel
//! ";
//!
//! let run = extract_text(text);
//! assert_eq!(run.report.producer, Producer::LineParser);
//! let case = &run.cases[0];
//! assert_eq!(case.requirement, "Login");
//! assert_eq!(case.given, "o usuário está cadastrado");
//! assert_eq!(case.when, "informa a senha correta");
//! ```
//!
//! [`TestCase`]: casegen_core::TestCase

pub mod adapters;
pub mod error;
pub mod fallback;
pub mod output;
pub mod parser;
pub mod quality;
pub mod report;
pub mod session;
pub mod tree;

use casegen_core::{Producer, SourceFormat};
use serde_json::Value;
use tracing::{debug, info};

pub use adapters::{Document, DocumentContent, DocumentLoader, detect_format};
pub use error::{AdapterError, ExtractError, Result};
pub use report::{ExtractionReport, ExtractionRun};
pub use session::Session;

use parser::{LineParser, normalize_text};
use tree::{TreeExtraction, XmlElement, extract_json_tree, extract_xml_tree};

/// Extracts cases from a loaded document.
pub fn extract(document: &Document) -> ExtractionRun {
    let mut run = match &document.content {
        DocumentContent::Text(text) => extract_text_as(document.format, text),
        DocumentContent::Json(value) => extract_json(value),
        DocumentContent::Xml(root) => extract_xml(root),
    };
    run.report.source = document.source.clone();
    run
}

/// Extracts cases from plain text.
///
/// Equivalent to [`extract_text_as`] with [`SourceFormat::Text`].
pub fn extract_text(text: &str) -> ExtractionRun {
    extract_text_as(SourceFormat::Text, text)
}

/// Extracts cases from text that came from a document of `format`.
///
/// The text is normalized, scanned by the line parser and, when that finds
/// nothing, handed to the fallback synthesizer.
pub fn extract_text_as(format: SourceFormat, text: &str) -> ExtractionRun {
    let normalized = normalize_text(text);
    let parse = LineParser::parse(&normalized);

    let mut report = ExtractionReport::new(format, Producer::LineParser);
    report.coverage = parse.diagnostics.coverage();
    report.warnings = parse.diagnostics.warnings();
    report.lines = Some(parse.diagnostics);

    let cases = if parse.cases.is_empty() {
        fallback_into(&mut report, &normalized)
    } else {
        parse.cases
    };
    finish(cases, report)
}

/// Extracts cases from a JSON tree, falling back to the pretty-printed
/// document when no test-case object is found.
///
/// # Examples
///
/// ```
/// use casegen_extract::extract_json;
///
/// let value = serde_json::json!([
///     {"test": "login", "given": "a user", "when": "signs in", "then": "sees home"},
///     {"test": "logout", "then": "sees login"}
/// ]);
/// let run = extract_json(&value);
/// assert_eq!(run.cases.len(), 2);
/// assert!(!run.report.fallback_used);
/// ```
pub fn extract_json(value: &Value) -> ExtractionRun {
    let extraction = extract_json_tree(value);
    let report = tree_report(SourceFormat::Json, Producer::JsonTree, &extraction);
    finish_tree(extraction, report, || {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    })
}

/// Extracts cases from an XML element tree, falling back to the serialized
/// tree when nothing is found.
pub fn extract_xml(root: &XmlElement) -> ExtractionRun {
    let extraction = extract_xml_tree(root);
    let report = tree_report(SourceFormat::Xml, Producer::XmlTree, &extraction);
    finish_tree(extraction, report, || root.to_xml_string())
}

fn tree_report(format: SourceFormat, producer: Producer, extraction: &TreeExtraction) -> ExtractionReport {
    let mut report = ExtractionReport::new(format, producer);
    report.nodes_visited = extraction.nodes_visited;
    report.depth_hits = extraction.depth_hits;
    if extraction.depth_hits > 0 {
        report.warnings.push(format!(
            "{} subtree(s) nested deeper than {} levels were skipped",
            extraction.depth_hits,
            tree::MAX_TREE_DEPTH
        ));
    }
    report
}

fn finish_tree(
    extraction: TreeExtraction,
    mut report: ExtractionReport,
    serialized: impl FnOnce() -> String,
) -> ExtractionRun {
    let cases = if extraction.cases.is_empty() {
        let text = serialized();
        fallback_into(&mut report, &text)
    } else {
        extraction.cases
    };
    finish(cases, report)
}

fn fallback_into(report: &mut ExtractionReport, content: &str) -> Vec<casegen_core::TestCase> {
    debug!(format = %report.format, "No structured cases found, using fallback");
    report.producer = Producer::Fallback;
    report.fallback_used = true;
    report
        .warnings
        .push("No test-case structure recognized; fallback cases need manual completion".to_string());
    fallback::synthesize(content)
}

fn finish(cases: Vec<casegen_core::TestCase>, mut report: ExtractionReport) -> ExtractionRun {
    report.case_count = cases.len();
    if cases.is_empty() {
        report
            .warnings
            .push("Document produced no test cases".to_string());
    }
    info!(
        format = %report.format,
        producer = %report.producer,
        cases = report.case_count,
        "Extraction finished"
    );
    ExtractionRun { cases, report }
}
