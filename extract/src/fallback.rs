//! Paragraph-based case synthesis for documents with no recognizable
//! structure.

use casegen_core::TestCase;
use tracing::debug;

/// Paragraphs at or below this many characters (after trimming) are skipped.
pub const MIN_PARAGRAPH_CHARS: usize = 20;

/// At most this many fallback cases are produced.
pub const MAX_FALLBACK_CASES: usize = 10;

/// Scenario text longer than this is truncated with an ellipsis.
pub const SCENARIO_PREVIEW_CHARS: usize = 80;

pub const GIVEN_PLACEHOLDER: &str = "Context to be defined";
pub const WHEN_PLACEHOLDER: &str = "Action to be specified";
pub const THEN_PLACEHOLDER: &str = "Expected result to be determined";

/// Splits `content` on blank lines and turns each long-enough paragraph
/// into a placeholder case that needs manual completion.
///
/// # Examples
///
/// ```
/// use casegen_extract::fallback::{synthesize, GIVEN_PLACEHOLDER};
///
/// let cases = synthesize("Short.\n\nThis paragraph is long enough to become a case.");
/// assert_eq!(cases.len(), 1);
/// assert_eq!(cases[0].requirement, "Requirement 1");
/// assert_eq!(cases[0].given, GIVEN_PLACEHOLDER);
/// ```
pub fn synthesize(content: &str) -> Vec<TestCase> {
    let cases: Vec<TestCase> = paragraphs(content)
        .filter(|paragraph| paragraph.chars().count() > MIN_PARAGRAPH_CHARS)
        .take(MAX_FALLBACK_CASES)
        .enumerate()
        .map(|(idx, paragraph)| {
            TestCase::new(
                format!("Requirement {}", idx + 1),
                preview(paragraph),
                GIVEN_PLACEHOLDER,
                WHEN_PLACEHOLDER,
                THEN_PLACEHOLDER,
            )
        })
        .collect();

    debug!(cases = cases.len(), "Fallback synthesis produced cases");
    cases
}

/// Trimmed paragraphs separated by lines that are empty or whitespace-only.
fn paragraphs(content: &str) -> impl Iterator<Item = &str> {
    let mut blocks = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(s) = start.take() {
                blocks.push(&content[s..end]);
            }
        } else {
            start.get_or_insert(offset);
            end = offset + line.len();
        }
        offset += line.len();
    }
    if let Some(s) = start {
        blocks.push(&content[s..end]);
    }

    blocks.into_iter().map(str::trim)
}

fn preview(paragraph: &str) -> String {
    if paragraph.chars().count() <= SCENARIO_PREVIEW_CHARS {
        return paragraph.to_string();
    }
    let truncated: String = paragraph.chars().take(SCENARIO_PREVIEW_CHARS).collect();
    format!("{truncated}...")
}
